//! Request-processing core of a small HTTP framework.
//!
//! # Architecture Overview
//!
//! ```text
//!     server adapter (not part of this crate)
//!         │ Request
//!         ▼
//!     ┌──────────────────────────── middleware ────────────────────────────┐
//!     │ request id → access log → cookies → sessions → locale → compression │
//!     │                         → user middleware                           │
//!     └──────────────────────────────────┬─────────────────────────────────┘
//!                                        ▼
//!                               routing (pattern router)
//!                                        │ path params bound
//!                                        ▼
//!                                     handler
//!
//!     negotiation: quality values, Accept-Encoding, Accept-Language
//!     session:     store with lazy expiry + periodic housekeeping
//!     config, observability: TOML settings, tracing, metrics
//! ```

pub mod app;
pub mod config;
pub mod http;
pub mod middleware;
pub mod negotiation;
pub mod observability;
pub mod routing;
pub mod session;

pub use crate::app::App;
pub use crate::config::{ConfigError, ServerConfig};
pub use crate::http::{CookieJar, Request, Response};
pub use crate::middleware::{from_fn, handler, BoxHandler, Handler, Middleware, Next, Pipeline};
pub use crate::negotiation::{select_best_encoding, LanguageNegotiator, QualityValues};
pub use crate::routing::{Router, RoutingError};
pub use crate::session::{InMemorySessionStore, Session, SessionError, SessionStore};
