//! Request/response model shared by every stage of the pipeline.
//!
//! # Data Flow
//! ```text
//! server adapter (sockets, HTTP parsing; not part of this crate)
//!     → request.rs (method, path, headers, params, attributes, cookies, body)
//!     → [middleware pipeline → router → handler]
//!     → response.rs (status, headers, cookies, body, done marker)
//!     → server adapter writes it out
//! ```
//!
//! # Design Decisions
//! - Plain owned structs; `From` conversions to and from `http` types let
//!   any adapter plug in
//! - Request-scoped state travels as typed attributes, never globals
//! - cookie.rs tracks only cookies changed during this request

pub mod cookie;
pub mod request;
pub mod response;

pub use self::cookie::CookieJar;
pub use request::{Params, Request};
pub use response::Response;
