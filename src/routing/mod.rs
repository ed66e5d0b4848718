//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (method predicate, then path pattern)
//!     → matched: bind path params, invoke handler
//!     → no match: 404 "Not found: <path>"
//!
//! Route Compilation (at startup):
//!     get|post|put|delete|map(pattern).to(handler)
//!     → RoutePattern::compile (literal / :param segments)
//!     → Router::into_handler (frozen, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{Matcher, MethodMatcher, RoutePattern, Segment};
pub use router::{Route, RouteBuilder, Router, RoutingError};
