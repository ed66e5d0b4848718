//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Find the first route whose method and pattern match the request
//! - Bind path parameters onto the request and invoke the handler
//! - Answer unmatched requests with a deterministic 404
//!
//! # Design Decisions
//! - Immutable once turned into a handler (thread-safe without locks)
//! - First match wins; registration order is priority
//! - O(n) scan over routes (acceptable for typical route counts)
//! - An empty router is a programming error, reported when building the handler

use std::fmt;
use std::sync::Arc;

use http::Method;
use thiserror::Error;

use super::matcher::{Matcher, MethodMatcher, RoutePattern};
use crate::http::{Request, Response};
use crate::middleware::pipeline::{BoxHandler, Handler};
use crate::observability::metrics;

/// Errors raised while assembling routes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("router has no registered routes")]
    NoRoutes,
}

/// A method predicate, a compiled pattern and the handler they guard.
pub struct Route {
    method: MethodMatcher,
    pattern: RoutePattern,
    handler: BoxHandler,
}

impl Route {
    pub fn method(&self) -> &MethodMatcher {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `pattern`.
    pub fn add<H: Handler>(
        &mut self,
        method: impl Into<MethodMatcher>,
        pattern: &str,
        handler: H,
    ) -> &mut Self {
        let route = Route {
            method: method.into(),
            pattern: RoutePattern::compile(pattern),
            handler: Arc::new(handler),
        };
        tracing::debug!(method = ?route.method, pattern, "Route registered");
        self.routes.push(route);
        self
    }

    pub fn get(&mut self, pattern: &str) -> RouteBuilder<'_> {
        self.on(Method::GET, pattern)
    }

    pub fn post(&mut self, pattern: &str) -> RouteBuilder<'_> {
        self.on(Method::POST, pattern)
    }

    pub fn put(&mut self, pattern: &str) -> RouteBuilder<'_> {
        self.on(Method::PUT, pattern)
    }

    pub fn delete(&mut self, pattern: &str) -> RouteBuilder<'_> {
        self.on(Method::DELETE, pattern)
    }

    /// Any method.
    pub fn map(&mut self, pattern: &str) -> RouteBuilder<'_> {
        self.on(MethodMatcher::Any, pattern)
    }

    fn on(&mut self, method: impl Into<MethodMatcher>, pattern: &str) -> RouteBuilder<'_> {
        RouteBuilder {
            router: self,
            method: method.into(),
            pattern: pattern.to_string(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch to the first matching route, or produce a 404.
    pub fn dispatch(&self, mut req: Request) -> Result<Response, RoutingError> {
        if self.routes.is_empty() {
            return Err(RoutingError::NoRoutes);
        }

        for route in &self.routes {
            if !route.method.matches(&req) {
                continue;
            }
            if let Some(params) = route.pattern.match_path(req.path()) {
                req.bind_path_params(params);
                return Ok(route.handler.call(req));
            }
        }

        tracing::debug!(method = %req.method(), path = %req.path(), "No route matched");
        metrics::record_route_miss();
        Ok(Response::not_found(req.path()))
    }

    /// Freeze the table into a pipeline terminal.
    pub fn into_handler(self) -> Result<BoxHandler, RoutingError> {
        if self.routes.is_empty() {
            return Err(RoutingError::NoRoutes);
        }

        let router = Arc::new(self);
        Ok(Arc::new(move |req: Request| {
            router
                .dispatch(req)
                .unwrap_or_else(|_| Response::new(http::StatusCode::INTERNAL_SERVER_ERROR))
        }))
    }
}

/// Pending registration from the `get|post|put|delete|map(pattern)` DSL,
/// completed by [`RouteBuilder::to`].
pub struct RouteBuilder<'a> {
    router: &'a mut Router,
    method: MethodMatcher,
    pattern: String,
}

impl<'a> RouteBuilder<'a> {
    pub fn to<H: Handler>(self, handler: H) -> &'a mut Router {
        let RouteBuilder {
            router,
            method,
            pattern,
        } = self;
        router.add(method, &pattern, handler)
    }
}
