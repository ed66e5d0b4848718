//! Session identifier policy.
//!
//! Identifiers are bearer credentials: anyone holding one owns the session.
//! The default generator draws from `rand::thread_rng`, a CSPRNG seeded
//! from the operating system. 32 alphanumeric characters carry about 190
//! bits of entropy.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const DEFAULT_ID_LENGTH: usize = 32;

/// Shortest identifier the random generator will produce.
pub const MIN_ID_LENGTH: usize = 16;

/// Mints new session identifiers.
pub trait SessionIdGenerator: Send + Sync + fmt::Debug {
    fn generate(&self) -> String;
}

/// Unpredictable alphanumeric identifiers.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    /// Lengths below [`MIN_ID_LENGTH`] are raised to it.
    pub fn new(length: usize) -> Self {
        if length < MIN_ID_LENGTH {
            tracing::warn!(
                requested = length,
                minimum = MIN_ID_LENGTH,
                "Session id length too short, using minimum"
            );
        }
        Self {
            length: length.max(MIN_ID_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl SessionIdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Predictable identifiers (`<prefix>1`, `<prefix>2`, ...). Tests only:
/// never use this where identifiers reach a client.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl SessionIdGenerator for SequentialIdGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ids_have_requested_shape() {
        let id = RandomIdGenerator::new(40).generate();
        assert_eq!(id.len(), 40);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_short_lengths_are_raised_to_minimum() {
        for requested in [0, 1, 15] {
            let generator = RandomIdGenerator::new(requested);
            assert_eq!(generator.length(), MIN_ID_LENGTH);
            assert_eq!(generator.generate().len(), MIN_ID_LENGTH);
        }
        assert_eq!(RandomIdGenerator::new(16).length(), 16);
    }

    #[test]
    fn test_random_ids_do_not_repeat() {
        let generator = RandomIdGenerator::default();
        let ids: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_sequential_ids() {
        let generator = SequentialIdGenerator::new("s-");
        assert_eq!(generator.generate(), "s-1");
        assert_eq!(generator.generate(), "s-2");
    }
}
