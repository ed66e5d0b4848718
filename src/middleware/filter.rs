//! Path-prefix filtering.
//!
//! Sends requests under selected path prefixes through extra middleware
//! before they fall through to the rest of the pipeline. Prefixes are
//! checked in registration order and the first match wins, so register
//! the most specific prefix first.

use std::sync::Arc;

use super::pipeline::{compose, BoxHandler, Handler, Middleware};
use crate::http::Request;

/// Middleware that branches on path prefix.
#[derive(Clone, Default)]
pub struct PrefixFilter {
    branches: Vec<(String, Vec<Arc<dyn Middleware>>)>,
}

impl PrefixFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route requests whose path starts with `prefix` through `middleware`.
    pub fn when(mut self, prefix: impl Into<String>, middleware: Vec<Arc<dyn Middleware>>) -> Self {
        self.branches.push((prefix.into(), middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl Middleware for PrefixFilter {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let branches: Vec<(String, BoxHandler)> = self
            .branches
            .iter()
            .map(|(prefix, chain)| (prefix.clone(), compose(chain, next.clone())))
            .collect();

        Arc::new(move |req: Request| {
            let branch = branches
                .iter()
                .find(|(prefix, _)| matches_prefix(req.path(), prefix))
                .map(|(_, handler)| handler);

            match branch {
                Some(handler) => handler.call(req),
                None => next.call(req),
            }
        })
    }
}

/// Prefix match on whole segments: `/admin` matches `/admin` and
/// `/admin/x` but not `/administrator`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
