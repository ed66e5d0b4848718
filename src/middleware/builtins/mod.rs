//! Middleware shipped with the crate.
//!
//! [`crate::app::App`] installs them in this order, outermost first:
//!
//! ```text
//! RequestId → AccessLog → Cookies → Sessions → Locale → Compression → user middleware → Router
//! ```
//!
//! Each one stores what it resolved as a typed request attribute
//! (`RequestId`, `CookieJar`, `Session`, `Locale`, `NegotiatedEncoding`).

pub mod access_log;
pub mod compression;
pub mod cookies;
pub mod locale;
pub mod request_id;
pub mod sessions;

pub use access_log::AccessLogMiddleware;
pub use compression::{CompressionMiddleware, NegotiatedEncoding};
pub use cookies::CookieMiddleware;
pub use locale::{Locale, LocaleMiddleware};
pub use request_id::{RequestId, RequestIdMiddleware};
pub use sessions::SessionMiddleware;
