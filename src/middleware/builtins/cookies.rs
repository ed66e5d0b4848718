//! Cookie jar lifecycle.

use std::sync::Arc;

use crate::http::{CookieJar, Request};
use crate::middleware::pipeline::{BoxHandler, Handler, Middleware};

/// Attaches a [`CookieJar`] to the request and writes its `Set-Cookie`
/// delta onto the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieMiddleware;

impl Middleware for CookieMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(move |mut req: Request| {
            let jar = CookieJar::from_request(&req);
            req.insert_attribute(jar.clone());
            let mut resp = next.call(req);
            jar.write_to(&mut resp);
            resp
        })
    }
}
