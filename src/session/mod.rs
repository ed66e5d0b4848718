//! Server-side sessions.
//!
//! # Data Flow
//! ```text
//! cookie id → SessionStore::load ──► Session (live, or None if expired)
//!                                       │ attributes read/written by handlers
//!                                       ▼
//!                              SessionStore::save → id (minted on first save)
//!
//! Housekeeper ──(interval)──► SessionStore::house_keeping
//! ```

pub mod clock;
pub mod housekeeping;
pub mod id;
#[allow(clippy::module_inception)]
pub mod session;
pub mod store;

use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use housekeeping::{Housekeeper, HousekeepingHandle};
pub use id::{RandomIdGenerator, SequentialIdGenerator, SessionIdGenerator};
pub use session::{Session, NEVER_EXPIRES};
pub use store::{InMemorySessionStore, SessionStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {id} has been invalidated")]
    Invalidated { id: String },

    #[error("session attribute {key} could not be converted: {source}")]
    Attribute {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no unused session id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },
}
