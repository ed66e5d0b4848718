//! Outbound response model.
//!
//! # Responsibilities
//! - Status, headers and a buffered body produced by handlers
//! - Cookie emission via `Set-Cookie`
//! - A `done` marker telling the server adapter the response is complete
//!
//! # Design Decisions
//! - Body is fully buffered (`Bytes`); streaming belongs to the adapter
//! - Invalid header values are dropped with a debug log, never a panic

use bytes::Bytes;
use cookie::Cookie;
use http::header::{self, HeaderMap, HeaderValue, IntoHeaderName};
use http::StatusCode;

#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    done: bool,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// A `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut response = Self::new(status);
        response.set_header(header::CONTENT_TYPE, "text/plain; charset=utf-8");
        response.set_body(body.into());
        response
    }

    /// Deterministic 404 for an unmatched path.
    pub fn not_found(path: &str) -> Self {
        Self::text(StatusCode::NOT_FOUND, format!("Not found: {}", path))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Replace any existing values of `name`.
    pub fn set_header(&mut self, name: impl IntoHeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(_) => tracing::debug!(value, "Dropping invalid response header value"),
        }
    }

    /// Add a value without replacing existing ones.
    pub fn append_header(&mut self, name: impl IntoHeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.append(name, v);
            }
            Err(_) => tracing::debug!(value, "Dropping invalid response header value"),
        }
    }

    pub fn with_header(mut self, name: impl IntoHeaderName, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn remove_header(&mut self, name: impl header::AsHeaderName) -> Option<HeaderValue> {
        self.headers.remove(name)
    }

    /// Emit a `Set-Cookie` header for `cookie`.
    pub fn add_cookie(&mut self, cookie: &Cookie<'_>) {
        self.append_header(header::SET_COOKIE, &cookie.to_string());
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replace the body and keep `Content-Length` in step with it.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
        self.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(self.body.len()));
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.set_body(body);
        self
    }

    /// Mark the response complete; the adapter may flush it.
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn done(mut self) -> Self {
        self.done = true;
        self
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(response: Response) -> Self {
        let mut out = http::Response::new(response.body);
        *out.status_mut() = response.status;
        *out.headers_mut() = response.headers;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let resp = Response::text(StatusCode::OK, "hello");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(resp.header("content-length"), Some("5"));
        assert_eq!(resp.body().as_ref(), b"hello");
    }

    #[test]
    fn test_not_found_body_names_path() {
        let resp = Response::not_found("/missing");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.body().as_ref(), b"Not found: /missing");
    }

    #[test]
    fn test_header_set_append_remove() {
        let mut resp = Response::ok();
        resp.set_header("x-a", "1");
        resp.set_header("x-a", "2");
        resp.append_header("vary", "Accept-Encoding");
        resp.append_header("vary", "Accept-Language");
        assert_eq!(resp.header("x-a"), Some("2"));
        assert_eq!(resp.headers().get_all("vary").iter().count(), 2);
        assert!(resp.remove_header("x-a").is_some());
        assert!(resp.header("x-a").is_none());
    }

    #[test]
    fn test_invalid_header_value_is_dropped() {
        let mut resp = Response::ok();
        resp.set_header("x-bad", "line\nbreak");
        assert!(resp.header("x-bad").is_none());
    }

    #[test]
    fn test_add_cookie() {
        let mut resp = Response::ok();
        let mut cookie = Cookie::new("theme", "dark");
        cookie.set_path("/");
        resp.add_cookie(&cookie);
        assert_eq!(resp.header("set-cookie"), Some("theme=dark; Path=/"));
    }

    #[test]
    fn test_done_marker() {
        let resp = Response::ok();
        assert!(!resp.is_done());
        assert!(resp.done().is_done());
    }

    #[test]
    fn test_into_http_response() {
        let resp = Response::text(StatusCode::CREATED, "made").with_header("x-id", "9");
        let http_resp: http::Response<Bytes> = resp.into();
        assert_eq!(http_resp.status(), StatusCode::CREATED);
        assert_eq!(http_resp.headers()["x-id"], "9");
        assert_eq!(http_resp.body().as_ref(), b"made");
    }
}
