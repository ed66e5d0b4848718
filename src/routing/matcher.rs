//! Route matching logic.
//!
//! # Responsibilities
//! - Compile path patterns (`/albums/:id`) into literal and named segments
//! - Match request paths, binding named segments to their values
//! - Match request methods, with a wildcard for "any method"
//!
//! # Design Decisions
//! - Literal segments are case-sensitive and must match exactly
//! - A named segment matches any non-empty segment
//! - Segment counts must be equal; there is no catch-all segment
//! - No regex, matching is a single pass over the segments

use std::collections::HashMap;
use std::fmt;

use http::Method;

use crate::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request) -> bool;
}

/// Matches the request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatcher {
    Any,
    Exact(Method),
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(method) => req.method() == method,
        }
    }
}

impl From<Method> for MethodMatcher {
    fn from(method: Method) -> Self {
        MethodMatcher::Exact(method)
    }
}

/// One `/`-delimited piece of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Compiled path template. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern string. Never fails: a bare `:` has no name and
    /// is kept as a literal segment.
    pub fn compile(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the parameter segments, in order.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Match `path`, returning the bound parameters or `None`.
    ///
    /// A name used twice binds the value of its last occurrence.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.to_string());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
