//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use http::header::SET_COOKIE;
use switchyard::session::{InMemorySessionStore, ManualClock, SequentialIdGenerator};
use switchyard::{App, BoxHandler, Request, Response, Router, ServerConfig};

/// Store on a manual clock with predictable ids (`sid1`, `sid2`, ...).
pub fn manual_store(max_age: i64) -> (Arc<InMemorySessionStore>, ManualClock) {
    let clock = ManualClock::default();
    let store = InMemorySessionStore::new(max_age)
        .with_clock(clock.clone())
        .with_id_generator(SequentialIdGenerator::new("sid"));
    (Arc::new(store), clock)
}

/// Build a full app around `store` and the routes registered by `routes`.
pub fn build_app(
    config: ServerConfig,
    store: Arc<InMemorySessionStore>,
    routes: impl FnOnce(&mut Router),
) -> BoxHandler {
    App::new(config)
        .with_store(store)
        .routes(routes)
        .build()
        .expect("app has routes")
}

pub fn body_string(resp: &Response) -> String {
    String::from_utf8(resp.body().to_vec()).expect("utf-8 body")
}

pub fn set_cookies(resp: &Response) -> Vec<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `name=value` of the first `Set-Cookie` for `name`, ready for a `Cookie` header.
pub fn cookie_pair(resp: &Response, name: &str) -> Option<String> {
    set_cookies(resp)
        .into_iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
        .and_then(|c| c.split(';').next().map(str::to_string))
}

pub fn get_with_cookie(path: &str, cookie: &str) -> Request {
    Request::get(path).with_header("cookie", cookie)
}
