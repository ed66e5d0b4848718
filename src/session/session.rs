//! Server-side session state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::SessionError;

/// `max_age` value for sessions that never expire.
pub const NEVER_EXPIRES: i64 = -1;

/// Handle to one session.
///
/// Clones share state, so the copy held by the store and the copy handed to
/// a request observe the same attributes. Attribute access is safe from
/// several threads at once. Once invalidated, every read or write of
/// attributes fails with [`SessionError::Invalidated`].
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    meta: Mutex<Meta>,
    attributes: DashMap<String, Value>,
    invalid: AtomicBool,
    modified: AtomicBool,
}

#[derive(Debug, Clone)]
struct Meta {
    id: Option<String>,
    created_at: Option<SystemTime>,
    updated_at: SystemTime,
    max_age: i64,
}

impl Session {
    /// A session that has not been persisted yet: no id, no creation time.
    pub(crate) fn new(now: SystemTime, max_age: i64) -> Self {
        Self {
            inner: Arc::new(Inner {
                meta: Mutex::new(Meta {
                    id: None,
                    created_at: None,
                    updated_at: now,
                    max_age,
                }),
                attributes: DashMap::new(),
                invalid: AtomicBool::new(false),
                modified: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> Option<String> {
        self.inner.meta.lock().id.clone()
    }

    /// True until the store has assigned an id.
    pub fn is_new(&self) -> bool {
        self.inner.meta.lock().id.is_none()
    }

    pub fn created_at(&self) -> Option<SystemTime> {
        self.inner.meta.lock().created_at
    }

    pub fn updated_at(&self) -> SystemTime {
        self.inner.meta.lock().updated_at
    }

    /// Seconds of inactivity allowed; negative means never expires.
    pub fn max_age(&self) -> i64 {
        self.inner.meta.lock().max_age
    }

    pub fn set_max_age(&self, seconds: i64) -> Result<(), SessionError> {
        self.ensure_valid()?;
        self.inner.meta.lock().max_age = seconds;
        self.mark_modified();
        Ok(())
    }

    /// `updated_at + max_age`, or `None` for sessions that never expire.
    pub fn expiration_time(&self) -> Option<SystemTime> {
        let meta = self.inner.meta.lock();
        let max_age = u64::try_from(meta.max_age).ok()?;
        meta.updated_at.checked_add(Duration::from_secs(max_age))
    }

    /// Whether the expiration time lies strictly before `now`.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self.expiration_time() {
            Some(expires) => now > expires,
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        self.ensure_valid()?;
        Ok(self.inner.attributes.get(key).map(|v| v.value().clone()))
    }

    /// Read an attribute and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| SessionError::Attribute {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Store an attribute, returning the previous value.
    pub fn put<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<Option<Value>, SessionError> {
        self.ensure_valid()?;
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| SessionError::Attribute {
            key: key.clone(),
            source,
        })?;
        self.mark_modified();
        Ok(self.inner.attributes.insert(key, value))
    }

    pub fn remove(&self, key: &str) -> Result<Option<Value>, SessionError> {
        self.ensure_valid()?;
        let removed = self.inner.attributes.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.mark_modified();
        }
        Ok(removed)
    }

    pub fn attribute_names(&self) -> Result<Vec<String>, SessionError> {
        self.ensure_valid()?;
        Ok(self.inner.attributes.iter().map(|e| e.key().clone()).collect())
    }

    /// Mark the session unusable. Idempotent.
    pub fn invalidate(&self) {
        self.inner.invalid.store(true, Ordering::SeqCst);
    }

    pub fn is_invalid(&self) -> bool {
        self.inner.invalid.load(Ordering::SeqCst)
    }

    /// Whether attributes or max age changed since the session was created
    /// or loaded.
    pub fn is_modified(&self) -> bool {
        self.inner.modified.load(Ordering::Relaxed)
    }

    /// True when both handles refer to the same session.
    pub fn ptr_eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn mark_modified(&self) {
        self.inner.modified.store(true, Ordering::Relaxed);
    }

    fn ensure_valid(&self) -> Result<(), SessionError> {
        if self.is_invalid() {
            return Err(SessionError::Invalidated {
                id: self.id().unwrap_or_else(|| "<unsaved>".to_string()),
            });
        }
        Ok(())
    }

    /// First persist: bind the id and stamp both timestamps.
    pub(crate) fn assign(&self, id: &str, now: SystemTime) {
        let mut meta = self.inner.meta.lock();
        meta.id = Some(id.to_string());
        meta.created_at = Some(now);
        meta.updated_at = now;
    }

    pub(crate) fn touch(&self, now: SystemTime) {
        self.inner.meta.lock().updated_at = now;
    }

    pub(crate) fn clear_modified(&self) {
        self.inner.modified.store(false, Ordering::Relaxed);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = self.inner.meta.lock().clone();
        f.debug_struct("Session")
            .field("id", &meta.id)
            .field("created_at", &meta.created_at)
            .field("updated_at", &meta.updated_at)
            .field("max_age", &meta.max_age)
            .field("attributes", &self.inner.attributes.len())
            .field("invalid", &self.is_invalid())
            .finish()
    }
}
