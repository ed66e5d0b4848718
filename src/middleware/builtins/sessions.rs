//! Session resolution and persistence around a request.
//!
//! # Responsibilities
//! - Resolve the session cookie into a [`Session`] request attribute
//! - Persist the session after the handler returns
//! - Keep the session cookie in step with the stored session
//!
//! # Design Decisions
//! - A new session nobody wrote to is never stored, so anonymous traffic
//!   does not fill the store
//! - An unknown or expired id in the cookie yields a fresh session; the
//!   client's id is never adopted
//! - Cookie changes go through the request's [`CookieJar`]; without the
//!   cookie middleware in front, this middleware writes the jar itself

use std::sync::Arc;

use cookie::Cookie;

use crate::config::SessionConfig;
use crate::http::{CookieJar, Request};
use crate::middleware::pipeline::{BoxHandler, Handler, Middleware};
use crate::session::{Session, SessionStore};

#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    secure: bool,
    http_only: bool,
}

impl SessionMiddleware {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            cookie_name: config.cookie_name.clone(),
            secure: config.cookie_secure,
            http_only: config.cookie_http_only,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn session_cookie(&self, id: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), id))
            .path("/")
            .secure(self.secure)
            .http_only(self.http_only)
            .build()
    }

    fn discard_cookie(&self, jar: &CookieJar) {
        jar.remove(Cookie::build((self.cookie_name.clone(), "")).path("/").build());
    }

    /// Apply the post-handler transition for `session`.
    ///
    /// `stale_cookie` is set when the client sent a session cookie that
    /// named no live session.
    fn commit(&self, session: &Session, loaded_id: Option<&str>, stale_cookie: bool, jar: &CookieJar) {
        if session.is_invalid() {
            if let Some(id) = session.id() {
                self.store.destroy(&id);
            }
            if jar.get(&self.cookie_name).is_some() {
                self.discard_cookie(jar);
            }
            return;
        }

        if session.is_new() && !session.is_modified() {
            if stale_cookie {
                self.discard_cookie(jar);
            }
            return;
        }

        match self.store.save(session) {
            Ok(id) => {
                if loaded_id != Some(id.as_str()) {
                    jar.add(self.session_cookie(id));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save session");
            }
        }
    }
}

impl Middleware for SessionMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let this = self.clone();
        Arc::new(move |mut req: Request| {
            let (jar, owns_jar) = match req.attribute::<CookieJar>() {
                Some(jar) => (jar.clone(), false),
                None => {
                    let jar = CookieJar::from_request(&req);
                    req.insert_attribute(jar.clone());
                    (jar, true)
                }
            };

            let presented = jar.get(&this.cookie_name);
            let loaded = presented
                .as_ref()
                .and_then(|c| this.store.load(c.value()));
            let stale_cookie = presented.is_some() && loaded.is_none();
            let loaded_id = loaded.as_ref().and_then(Session::id);
            let session = loaded.unwrap_or_else(|| this.store.create());

            req.insert_attribute(session.clone());
            let mut resp = next.call(req);

            this.commit(&session, loaded_id.as_deref(), stale_cookie, &jar);
            if owns_jar {
                jar.write_to(&mut resp);
            }
            resp
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use crate::middleware::pipeline::handler;
    use crate::session::{InMemorySessionStore, SequentialIdGenerator};
    use http::header::SET_COOKIE;

    fn setup() -> (Arc<InMemorySessionStore>, SessionMiddleware) {
        let store = Arc::new(
            InMemorySessionStore::new(60).with_id_generator(SequentialIdGenerator::new("id")),
        );
        let mw = SessionMiddleware::new(store.clone(), &SessionConfig::default());
        (store, mw)
    }

    fn set_cookie(resp: &Response) -> Option<String> {
        resp.headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_untouched_new_session_is_not_stored() {
        let (store, mw) = setup();
        let app = mw.wrap(handler(|_req: Request| Response::ok()));
        let resp = app.call(Request::get("/"));
        assert!(store.is_empty());
        assert_eq!(set_cookie(&resp), None);
    }

    #[test]
    fn test_written_session_is_stored_and_cookie_set() {
        let (store, mw) = setup();
        let app = mw.wrap(handler(|req: Request| {
            req.attribute::<Session>().unwrap().put("n", 1).unwrap();
            Response::ok()
        }));

        let resp = app.call(Request::get("/"));
        assert_eq!(store.len(), 1);
        let cookie = set_cookie(&resp).unwrap();
        assert!(cookie.starts_with("JSESSIONID=id1"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_known_session_is_reused_without_new_cookie() {
        let (store, mw) = setup();
        let session = store.create();
        session.put("user", "ada").unwrap();
        let id = store.save(&session).unwrap();

        let app = mw.wrap(handler(|req: Request| {
            let user: Option<String> = req.attribute::<Session>().unwrap().get_as("user").unwrap();
            Response::text(http::StatusCode::OK, user.unwrap_or_default())
        }));
        let resp = app.call(
            Request::get("/").with_header("cookie", &format!("JSESSIONID={}", id)),
        );
        assert_eq!(resp.body().as_ref(), b"ada");
        assert_eq!(set_cookie(&resp), None);
    }

    #[test]
    fn test_unknown_cookie_id_is_not_adopted() {
        let (store, mw) = setup();
        let app = mw.wrap(handler(|req: Request| {
            req.attribute::<Session>().unwrap().put("n", 1).unwrap();
            Response::ok()
        }));
        let resp = app.call(Request::get("/").with_header("cookie", "JSESSIONID=forged"));
        assert!(set_cookie(&resp).unwrap().starts_with("JSESSIONID=id1"));
        assert!(store.load("forged").is_none());
    }

    #[test]
    fn test_dead_session_cookie_is_cleared() {
        let (store, mw) = setup();
        let app = mw.wrap(handler(|_req: Request| Response::ok()));

        let resp = app.call(Request::get("/").with_header("cookie", "JSESSIONID=gone"));
        let cookie = set_cookie(&resp).unwrap();
        assert!(cookie.starts_with("JSESSIONID=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalidated_session_is_destroyed_and_cookie_discarded() {
        let (store, mw) = setup();
        let session = store.create();
        let id = store.save(&session).unwrap();

        let app = mw.wrap(handler(|req: Request| {
            req.attribute::<Session>().unwrap().invalidate();
            Response::ok()
        }));
        let resp = app.call(
            Request::get("/").with_header("cookie", &format!("JSESSIONID={}", id)),
        );
        assert!(store.load(&id).is_none());
        let cookie = set_cookie(&resp).unwrap();
        assert!(cookie.starts_with("JSESSIONID=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
