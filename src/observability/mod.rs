//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! router, sessions, built-in middleware produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → whichever subscriber `init_logging` installs (pretty or JSON on stdout)
//!     → whichever metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the request-id middleware into every log line
//!   emitted by the access log
//! - Without an installed recorder, metric updates are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
