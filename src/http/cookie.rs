//! Per-request cookie tracking.
//!
//! The jar remembers which cookies were set during this request (fresh) and
//! which were explicitly discarded, so only those two groups turn into
//! `Set-Cookie` headers. Cookies the client merely sent are never echoed.

use std::sync::Arc;

use cookie::Cookie;
use parking_lot::Mutex;

use super::{Request, Response};

/// Shared handle to one request's cookies.
///
/// Cloning is cheap and every clone sees the same state, so a middleware can
/// keep a handle while the request itself moves down the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    inner: Arc<Mutex<JarState>>,
}

#[derive(Debug, Default)]
struct JarState {
    incoming: Vec<Cookie<'static>>,
    fresh: Vec<Cookie<'static>>,
    discarded: Vec<Cookie<'static>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the jar with the cookies the client sent.
    pub fn from_request(req: &Request) -> Self {
        let jar = Self::new();
        jar.inner.lock().incoming = req.cookies();
        jar
    }

    /// Current view of a cookie: discarded hides it, fresh overrides incoming.
    pub fn get(&self, name: &str) -> Option<Cookie<'static>> {
        let state = self.inner.lock();
        if state.discarded.iter().any(|c| c.name() == name) {
            return None;
        }
        state
            .fresh
            .iter()
            .chain(state.incoming.iter())
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Set a cookie for this response. Cancels an earlier discard.
    pub fn add(&self, cookie: Cookie<'static>) {
        let mut state = self.inner.lock();
        state.discarded.retain(|c| c.name() != cookie.name());
        state.fresh.retain(|c| c.name() != cookie.name());
        state.fresh.push(cookie);
    }

    /// Discard a cookie on the client. Path and domain of `cookie` are kept
    /// so the removal targets the same cookie.
    pub fn remove(&self, mut cookie: Cookie<'static>) {
        cookie.make_removal();
        let mut state = self.inner.lock();
        state.fresh.retain(|c| c.name() != cookie.name());
        state.discarded.retain(|c| c.name() != cookie.name());
        state.discarded.push(cookie);
    }

    pub fn is_fresh(&self, name: &str) -> bool {
        self.inner.lock().fresh.iter().any(|c| c.name() == name)
    }

    pub fn is_discarded(&self, name: &str) -> bool {
        self.inner.lock().discarded.iter().any(|c| c.name() == name)
    }

    /// Cookies that must be sent back: fresh ones, then removal cookies.
    pub fn delta(&self) -> Vec<Cookie<'static>> {
        let state = self.inner.lock();
        state
            .fresh
            .iter()
            .chain(state.discarded.iter())
            .cloned()
            .collect()
    }

    /// Append the delta to `response` as `Set-Cookie` headers.
    pub fn write_to(&self, response: &mut Response) {
        for cookie in self.delta() {
            response.add_cookie(&cookie);
        }
    }
}
