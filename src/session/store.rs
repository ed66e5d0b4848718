//! Session persistence.
//!
//! # Responsibilities
//! - Allocate fresh sessions and assign ids on first save
//! - Look sessions up by id, dropping the ones that have expired
//! - Sweep expired and invalidated sessions in bulk
//!
//! # Design Decisions
//! - Expiry is checked lazily on every load, so the periodic sweep only
//!   reclaims memory and never decides visibility
//! - Saving a session whose id is unknown to the store mints a new id
//!   instead of adopting the caller's, so a client cannot pick its own id
//! - Time and id generation are injected to keep expiry deterministic in tests

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::clock::{Clock, SystemClock};
use super::id::{RandomIdGenerator, SessionIdGenerator};
use super::session::Session;
use super::SessionError;
use crate::config::SessionConfig;
use crate::observability::metrics;

/// Attempts at drawing an unused id before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

/// Storage backend for sessions.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// A new, unsaved session stamped with the current time.
    fn create(&self) -> Session;

    /// The live session stored under `id`, if any.
    fn load(&self, id: &str) -> Option<Session>;

    /// Persist `session`, returning the id it is stored under.
    fn save(&self, session: &Session) -> Result<String, SessionError>;

    /// Remove and invalidate the session stored under `id`. Idempotent.
    fn destroy(&self, id: &str);

    /// Remove every expired or invalidated session, returning how many
    /// were removed.
    fn house_keeping(&self) -> usize;

    /// Number of stored sessions, expired ones included until swept.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local session store.
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn SessionIdGenerator>,
    default_max_age: i64,
}

impl InMemorySessionStore {
    /// Store on the wall clock with random ids.
    pub fn new(default_max_age: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIdGenerator::default()),
            default_max_age,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_age_secs).with_id_generator(RandomIdGenerator::new(config.id_length))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_id_generator(mut self, ids: impl SessionIdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn default_max_age(&self) -> i64 {
        self.default_max_age
    }

    /// Bind a fresh id to `session` and insert it.
    fn insert_new(&self, session: &Session) -> Result<String, SessionError> {
        let now = self.clock.now();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            match self.sessions.entry(id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!("Session id collision, drawing another");
                }
                Entry::Vacant(slot) => {
                    session.assign(&id, now);
                    slot.insert(session.clone());
                    return Ok(id);
                }
            }
        }
        Err(SessionError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> Session {
        Session::new(self.clock.now(), self.default_max_age)
    }

    fn load(&self, id: &str) -> Option<Session> {
        let session = self.sessions.get(id).map(|entry| entry.value().clone())?;
        let now = self.clock.now();
        if session.is_invalid() || session.is_expired(now) {
            let removed = self
                .sessions
                .remove_if(id, |_, s| s.ptr_eq(&session))
                .is_some();
            session.invalidate();
            if removed {
                tracing::debug!(session_id = %id, "Session expired on access");
                metrics::record_sessions_expired(1);
                metrics::set_sessions_active(self.sessions.len());
            }
            return None;
        }
        Some(session)
    }

    fn save(&self, session: &Session) -> Result<String, SessionError> {
        if session.is_invalid() {
            return Err(SessionError::Invalidated {
                id: session.id().unwrap_or_else(|| "<unsaved>".to_string()),
            });
        }

        let known = session
            .id()
            .filter(|id| self.sessions.get(id).is_some_and(|s| s.ptr_eq(session)));

        let id = match known {
            Some(id) => {
                session.touch(self.clock.now());
                id
            }
            None => {
                let id = self.insert_new(session)?;
                tracing::debug!(session_id = %id, "Session created");
                metrics::record_session_created();
                metrics::set_sessions_active(self.sessions.len());
                id
            }
        };
        session.clear_modified();
        Ok(id)
    }

    fn destroy(&self, id: &str) {
        if let Some((_, session)) = self.sessions.remove(id) {
            session.invalidate();
            tracing::debug!(session_id = %id, "Session destroyed");
            metrics::set_sessions_active(self.sessions.len());
        }
    }

    fn house_keeping(&self) -> usize {
        let now = self.clock.now();
        let mut swept = Vec::new();
        self.sessions.retain(|_, session| {
            if session.is_invalid() || session.is_expired(now) {
                swept.push(session.clone());
                false
            } else {
                true
            }
        });

        for session in &swept {
            session.invalidate();
        }

        let remaining = self.sessions.len();
        metrics::record_sessions_expired(swept.len());
        metrics::set_sessions_active(remaining);
        if !swept.is_empty() {
            tracing::info!(removed = swept.len(), remaining, "Session housekeeping completed");
        }
        swept.len()
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

impl fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("sessions", &self.sessions.len())
            .field("clock", &self.clock)
            .field("ids", &self.ids)
            .field("default_max_age", &self.default_max_age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::ManualClock;
    use crate::session::id::SequentialIdGenerator;
    use crate::session::session::NEVER_EXPIRES;
    use serde_json::json;
    use std::time::Duration;

    fn store(max_age: i64) -> (InMemorySessionStore, ManualClock) {
        let clock = ManualClock::default();
        let store = InMemorySessionStore::new(max_age)
            .with_clock(clock.clone())
            .with_id_generator(SequentialIdGenerator::new("s"));
        (store, clock)
    }

    #[derive(Debug)]
    struct ConstantIds;

    impl SessionIdGenerator for ConstantIds {
        fn generate(&self) -> String {
            "same".to_string()
        }
    }

    #[test]
    fn test_create_is_unsaved() {
        let (store, clock) = store(60);
        let session = store.create();
        assert!(session.is_new());
        assert_eq!(session.updated_at(), clock.now());
        assert_eq!(session.max_age(), 60);
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (store, _clock) = store(60);
        let session = store.create();
        session.put("user", "ada").unwrap();

        let id = store.save(&session).unwrap();
        assert_eq!(id, "s1");
        assert_eq!(session.id().as_deref(), Some("s1"));
        assert!(session.created_at().is_some());

        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.get("user").unwrap(), Some(json!("ada")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resave_keeps_id_and_refreshes_timestamp() {
        let (store, clock) = store(60);
        let session = store.create();
        let id = store.save(&session).unwrap();
        let created = session.created_at();

        clock.advance(Duration::from_secs(10));
        assert_eq!(store.save(&session).unwrap(), id);
        assert_eq!(session.created_at(), created);
        assert_eq!(session.updated_at(), clock.now());
    }

    #[test]
    fn test_load_drops_expired_session() {
        let (store, clock) = store(30);
        let session = store.create();
        let id = store.save(&session).unwrap();

        clock.advance(Duration::from_secs(30));
        assert!(store.load(&id).is_some());

        clock.advance(Duration::from_secs(1));
        assert!(store.load(&id).is_none());
        assert!(session.is_invalid());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_refresh_extends_lifetime() {
        let (store, clock) = store(30);
        let session = store.create();
        let id = store.save(&session).unwrap();

        clock.advance(Duration::from_secs(20));
        store.save(&session).unwrap();
        clock.advance(Duration::from_secs(20));
        assert!(store.load(&id).is_some());
    }

    #[test]
    fn test_never_expiring_session() {
        let (store, clock) = store(NEVER_EXPIRES);
        let session = store.create();
        let id = store.save(&session).unwrap();

        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert!(store.load(&id).is_some());
        assert_eq!(store.house_keeping(), 0);
    }

    #[test]
    fn test_house_keeping_sweeps_expired_only() {
        let (store, clock) = store(30);
        let short = store.create();
        let long = store.create();
        long.set_max_age(300).unwrap();
        store.save(&short).unwrap();
        let long_id = store.save(&long).unwrap();

        clock.advance(Duration::from_secs(60));
        assert_eq!(store.house_keeping(), 1);
        assert_eq!(store.len(), 1);
        assert!(short.is_invalid());
        assert!(store.load(&long_id).is_some());
        assert_eq!(store.house_keeping(), 0);
    }

    #[test]
    fn test_house_keeping_sweeps_invalidated() {
        let (store, _clock) = store(60);
        let session = store.create();
        store.save(&session).unwrap();
        session.invalidate();
        assert_eq!(store.house_keeping(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_saving_invalidated_session_fails() {
        let (store, _clock) = store(60);
        let session = store.create();
        session.invalidate();
        assert!(matches!(
            store.save(&session),
            Err(SessionError::Invalidated { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (store, _clock) = store(60);
        let session = store.create();
        let id = store.save(&session).unwrap();

        store.destroy(&id);
        store.destroy(&id);
        store.destroy("never-existed");
        assert!(store.load(&id).is_none());
        assert!(session.is_invalid());
    }

    #[test]
    fn test_destroyed_session_cannot_be_resaved() {
        let (store, _clock) = store(60);
        let session = store.create();
        let id = store.save(&session).unwrap();
        store.destroy(&id);
        assert!(store.save(&session).is_err());
    }

    #[test]
    fn test_unknown_ids_are_never_adopted() {
        let (store, _clock) = store(60);
        let session = store.create();
        session.assign("chosen-by-client", std::time::SystemTime::now());

        let id = store.save(&session).unwrap();
        assert_ne!(id, "chosen-by-client");
        assert!(store.load("chosen-by-client").is_none());
        assert!(store.load(&id).is_some());
    }

    #[test]
    fn test_id_collisions_are_bounded() {
        let store = InMemorySessionStore::new(60).with_id_generator(ConstantIds);
        store.save(&store.create()).unwrap();
        assert!(matches!(
            store.save(&store.create()),
            Err(SessionError::IdSpaceExhausted { .. })
        ));
    }

    #[test]
    fn test_zero_id_length_config_still_mints_distinct_ids() {
        let config = SessionConfig {
            id_length: 0,
            ..SessionConfig::default()
        };
        let store = InMemorySessionStore::from_config(&config);
        let first = store.save(&store.create()).unwrap();
        let second = store.save(&store.create()).unwrap();
        assert_eq!(first.len(), crate::session::id::MIN_ID_LENGTH);
        assert_ne!(first, second);
    }

    #[test]
    fn test_concurrent_saves_get_distinct_ids() {
        let store = Arc::new(InMemorySessionStore::new(60));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| store.save(&store.create()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<String> = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
    }
}
