//! TTL Table
//!
//! Absolute expiration deadlines, in milliseconds since the Unix epoch.
//!
//! The table is a dumb deadline map: it answers "is this key expired as of
//! now?" and nothing else. The engine enforces that only indexed keys carry
//! deadlines and performs the lazy expiry materialization (synthetic DEL,
//! index removal) when a check comes back expired.

use std::collections::HashMap;

/// Result of checking a key's TTL at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlState {
    /// No deadline recorded
    NoTtl,

    /// Deadline in the future
    Alive { remaining_ms: i64 },

    /// Deadline at or before the queried time
    Expired,
}

/// Mapping from key to absolute expiration deadline
#[derive(Debug, Default)]
pub struct TtlTable {
    deadlines: HashMap<String, i64>,
}

impl TtlTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deadline, overwriting any previous one
    pub fn set(&mut self, key: String, deadline_ms: i64) {
        self.deadlines.insert(key, deadline_ms);
    }

    /// Remove a deadline. Idempotent; reports whether one was present.
    pub fn clear(&mut self, key: &str) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Look up the raw deadline
    pub fn deadline(&self, key: &str) -> Option<i64> {
        self.deadlines.get(key).copied()
    }

    /// Classify a key's TTL as of `now_ms`
    pub fn check(&self, key: &str, now_ms: i64) -> TtlState {
        match self.deadlines.get(key) {
            None => TtlState::NoTtl,
            Some(&deadline) if deadline > now_ms => TtlState::Alive {
                remaining_ms: deadline - now_ms,
            },
            Some(_) => TtlState::Expired,
        }
    }

    /// Number of keys with deadlines
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Check if no deadlines are recorded
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
