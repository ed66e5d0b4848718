//! Inbound request model.
//!
//! # Responsibilities
//! - Carry method, path, headers and body handed over by the server adapter
//! - Merge query, form body and path parameters into one lookup
//! - Hold typed request-scoped attributes for middleware hand-off
//! - Parse cookies from the `Cookie` header
//!
//! # Design Decisions
//! - Parameters keep insertion order: query, then form body, then path
//! - Invalid header names/values from builders are dropped, not fatal

use std::collections::HashMap;

use bytes::Bytes;
use cookie::Cookie;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Extensions, Method};

/// Multi-valued, insertion-ordered request parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string.
    pub fn from_urlencoded(input: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(input).into_owned().collect();
        Self { pairs }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn extend(&mut self, other: Params) {
        self.pairs.extend(other.pairs);
    }

    /// First value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value bound to `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A request as seen by middleware and handlers.
#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    params: Params,
    path_params: HashMap<String, String>,
    attributes: Extensions,
    body: Bytes,
}

impl Request {
    /// Create a request for `target`, a path with an optional query string.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (target, None),
        };

        let params = query
            .as_deref()
            .map(|q| Params::from_urlencoded(q.as_bytes()))
            .unwrap_or_default();

        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query,
            params,
            ..Self::default()
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: &str) -> Self {
        Self::new(Method::POST, target)
    }

    /// Append a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::debug!(header = name, "Ignoring invalid request header"),
        }
        self
    }

    /// Set the body. Form-encoded bodies are merged into the parameters
    /// after the query parameters.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        if self.is_form() {
            let form = Params::from_urlencoded(&self.body);
            self.params.extend(form);
        }
        self
    }

    fn is_form(&self) -> bool {
        self.header(header::CONTENT_TYPE)
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .eq_ignore_ascii_case("application/x-www-form-urlencoded")
            })
            .unwrap_or(false)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every value of a multi-valued header.
    pub fn header_all(&self, name: impl header::AsHeaderName) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// First value of a parameter from the query string, form body or path.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Value bound to a named path segment by the router.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Record path bindings. They are appended to the merged parameters and
    /// never replace query or body values of the same name.
    pub fn bind_path_params(&mut self, bindings: HashMap<String, String>) {
        for (name, value) in &bindings {
            self.params.append(name.clone(), value.clone());
        }
        self.path_params.extend(bindings);
    }

    pub fn attribute<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.attributes.get::<T>()
    }

    pub fn attribute_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.attributes.get_mut::<T>()
    }

    /// Store a typed attribute, returning the previous value of that type.
    pub fn insert_attribute<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.attributes.insert(value)
    }

    pub fn remove_attribute<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.attributes.remove::<T>()
    }

    /// Cookies sent by the client. Unparsable pairs are skipped.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.header_all(header::COOKIE)
            .into_iter()
            .flat_map(|line| Cookie::split_parse(line.to_string()))
            .filter_map(Result::ok)
            .collect()
    }

    /// Value of the first cookie named `name`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies()
            .into_iter()
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let mut request = Request::new(parts.method, target);
        request.headers = parts.headers;
        request.attributes = parts.extensions;
        request.with_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parameters() {
        let req = Request::get("/search?q=rust+lang&tag=a&tag=b");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query(), Some("q=rust+lang&tag=a&tag=b"));
        assert_eq!(req.param("q"), Some("rust lang"));
        assert_eq!(req.params().get_all("tag"), vec!["a", "b"]);
    }

    #[test]
    fn test_form_body_merges_after_query() {
        let req = Request::post("/login?user=query")
            .with_header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .with_body("user=form&pass=secret");
        assert_eq!(req.param("user"), Some("query"));
        assert_eq!(req.params().get_all("user"), vec!["query", "form"]);
        assert_eq!(req.param("pass"), Some("secret"));
    }

    #[test]
    fn test_non_form_body_is_not_parsed() {
        let req = Request::post("/upload")
            .with_header("content-type", "application/json")
            .with_body("a=b");
        assert!(req.params().is_empty());
        assert_eq!(req.body().as_ref(), b"a=b");
    }

    #[test]
    fn test_path_params_coexist_with_query() {
        let mut req = Request::get("/albums/7?id=fromquery");
        req.bind_path_params(HashMap::from([("id".to_string(), "7".to_string())]));
        assert_eq!(req.param("id"), Some("fromquery"));
        assert_eq!(req.path_param("id"), Some("7"));
        assert_eq!(req.params().get_all("id"), vec!["fromquery", "7"]);
    }

    #[test]
    fn test_cookies() {
        let req = Request::get("/")
            .with_header("cookie", "JSESSIONID=abc123; theme=dark")
            .with_header("cookie", "lang=fr");
        assert_eq!(req.cookie("JSESSIONID").as_deref(), Some("abc123"));
        assert_eq!(req.cookie("lang").as_deref(), Some("fr"));
        assert_eq!(req.cookies().len(), 3);
        assert!(req.cookie("missing").is_none());
    }

    #[test]
    fn test_attributes() {
        #[derive(Clone, Debug, PartialEq)]
        struct UserId(u32);

        let mut req = Request::get("/");
        assert!(req.attribute::<UserId>().is_none());
        req.insert_attribute(UserId(5));
        assert_eq!(req.attribute::<UserId>(), Some(&UserId(5)));
        assert_eq!(req.remove_attribute::<UserId>(), Some(UserId(5)));
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let req = Request::get("/").with_header("bad header", "x");
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_from_http_request() {
        let http_req = http::Request::builder()
            .method(Method::PUT)
            .uri("http://example.com/items/3?x=1")
            .header("accept-language", "fr")
            .body(Bytes::from_static(b"payload"))
            .unwrap();
        let req = Request::from(http_req);
        assert_eq!(req.method(), &Method::PUT);
        assert_eq!(req.path(), "/items/3");
        assert_eq!(req.param("x"), Some("1"));
        assert_eq!(req.header("accept-language"), Some("fr"));
        assert_eq!(req.body().as_ref(), b"payload");
    }
}
