//! HTTP content negotiation.
//!
//! # Data Flow
//! ```text
//! Accept-* header (untrusted client input)
//!     → quality.rs (split, weigh, rank; never fails)
//!     → encoding.rs (pick a content coding from server candidates)
//!     → language.rs (pick a supported locale, primary-subtag fallback)
//! ```
//!
//! # Design Decisions
//! - Malformed input degrades to defaults instead of erroring
//! - "No acceptable value" is an outcome, not an error
//! - Pure in-memory computation, safe to call from any thread

pub mod encoding;
pub mod language;
pub mod quality;

pub use encoding::{select_best_encoding, IDENTITY};
pub use language::LanguageNegotiator;
pub use quality::{HeaderEntry, QualityValues};
