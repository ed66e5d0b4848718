//! Request interception.
//!
//! # Data Flow
//! ```text
//! Request
//!     → builtins (request id, access log, cookies, sessions, locale, compression)
//!     → filter.rs (optional prefix-scoped chains)
//!     → user middleware
//!     → terminal handler (usually the router)
//! Response travels back out through the same layers in reverse.
//! ```
//!
//! # Design Decisions
//! - The chain is composed once; a request only walks pre-built closures
//! - Handlers are synchronous and shared across threads

pub mod builtins;
pub mod filter;
pub mod pipeline;

pub use filter::PrefixFilter;
pub use pipeline::{compose, from_fn, handler, BoxHandler, FromFn, Handler, Middleware, Next, Pipeline};
