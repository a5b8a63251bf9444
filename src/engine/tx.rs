//! Transaction overlay
//!
//! A staging buffer installed on top of the engine while a transaction is
//! active. Two structures, per the commit protocol:
//! - an append-ordered *journal* of records, written to the log as one batch
//!   at commit
//! - a sorted *shadow map* holding the latest pending effect per key, so the
//!   transaction's own reads (and range scans) see its writes
//!
//! The overlay never touches the log or the base state; the engine drains it
//! at commit and drops it at abort.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::log::Record;

/// Pending TTL effect for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TtlAction {
    /// EXPIRE staged: absolute deadline to install at commit
    Set(i64),

    /// PERSIST staged, or implied by a staged SET (a new binding has no TTL)
    Clear,
}

/// Latest pending effect for a key
#[derive(Debug)]
pub(crate) enum Pending {
    /// Key will be bound to this value
    Put { value: String, ttl: TtlAction },

    /// Key will be deleted
    Tombstone,

    /// Only the TTL changes; the value stays whatever the base holds
    TtlOnly(TtlAction),
}

/// Buffered writes of the active transaction
#[derive(Debug, Default)]
pub(crate) struct TxBuffer {
    journal: Vec<Record>,
    shadow: BTreeMap<String, Pending>,
}

impl TxBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records staged so far, in issue order
    pub(crate) fn journal(&self) -> &[Record] {
        &self.journal
    }

    /// Consume the buffer, yielding the journal for application
    pub(crate) fn into_journal(self) -> Vec<Record> {
        self.journal
    }

    /// The pending effect for a key, if the transaction touched it
    pub(crate) fn pending(&self, key: &str) -> Option<&Pending> {
        self.shadow.get(key)
    }

    /// The transaction's opinion on a key's value: `None` when untouched,
    /// `Some(None)` when pending-deleted, `Some(Some(v))` when pending-bound.
    pub(crate) fn value_view(&self, key: &str) -> Option<Option<&str>> {
        match self.shadow.get(key) {
            Some(Pending::Put { value, .. }) => Some(Some(value.as_str())),
            Some(Pending::Tombstone) => Some(None),
            Some(Pending::TtlOnly(_)) | None => None,
        }
    }

    // -------------------------------------------------------------------------
    // Staging
    // -------------------------------------------------------------------------

    pub(crate) fn stage_set(&mut self, key: String, value: String) {
        self.journal.push(Record::Set {
            key: key.clone(),
            value: value.clone(),
        });
        // A staged SET coalesces everything before it, TTL included.
        self.shadow.insert(
            key,
            Pending::Put {
                value,
                ttl: TtlAction::Clear,
            },
        );
    }

    pub(crate) fn stage_del(&mut self, key: &str) {
        self.journal.push(Record::Del {
            key: key.to_string(),
        });
        self.shadow.insert(key.to_string(), Pending::Tombstone);
    }

    pub(crate) fn stage_expire(&mut self, key: &str, deadline_ms: i64) {
        self.journal.push(Record::ExpireAt {
            key: key.to_string(),
            deadline_ms,
        });
        self.stage_ttl_action(key, TtlAction::Set(deadline_ms));
    }

    pub(crate) fn stage_persist(&mut self, key: &str) {
        self.journal.push(Record::Persist {
            key: key.to_string(),
        });
        self.stage_ttl_action(key, TtlAction::Clear);
    }

    fn stage_ttl_action(&mut self, key: &str, action: TtlAction) {
        match self.shadow.get_mut(key) {
            Some(Pending::Put { ttl, .. }) => *ttl = action,
            Some(Pending::TtlOnly(current)) => *current = action,
            // The engine checks existence before staging TTL ops, so a
            // tombstone here cannot happen; leave it untouched if it does.
            Some(Pending::Tombstone) => {}
            None => {
                self.shadow.insert(key.to_string(), Pending::TtlOnly(action));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Range merging
    // -------------------------------------------------------------------------

    /// Merge-join already-filtered base keys (sorted ascending) with the
    /// shadow's entries inside the same bounds: pending puts appear, pending
    /// deletes are suppressed, order is preserved.
    pub(crate) fn merge_keys(
        &self,
        base: Vec<String>,
        lo: Option<&str>,
        hi: Option<&str>,
    ) -> Vec<String> {
        let lo_bound = match lo {
            Some(s) => Bound::Included(s),
            None => Bound::Unbounded,
        };
        let hi_bound = match hi {
            Some(s) => Bound::Included(s),
            None => Bound::Unbounded,
        };

        let mut out = Vec::with_capacity(base.len());
        let mut base_iter = base.into_iter();
        let mut shadow_iter = self.shadow.range::<str, _>((lo_bound, hi_bound));
        let mut next_base = base_iter.next();
        let mut next_shadow = shadow_iter.next();

        loop {
            match (next_base.take(), next_shadow.take()) {
                (Some(b), Some((sk, pending))) => {
                    if b.as_str() < sk.as_str() {
                        out.push(b);
                        next_base = base_iter.next();
                        next_shadow = Some((sk, pending));
                    } else if b.as_str() > sk.as_str() {
                        // Key only in the shadow: a put created it.
                        if matches!(pending, Pending::Put { .. }) {
                            out.push(sk.clone());
                        }
                        next_base = Some(b);
                        next_shadow = shadow_iter.next();
                    } else {
                        // Both sides: the shadow's effect wins.
                        if !matches!(pending, Pending::Tombstone) {
                            out.push(b);
                        }
                        next_base = base_iter.next();
                        next_shadow = shadow_iter.next();
                    }
                }
                (Some(b), None) => {
                    out.push(b);
                    next_base = base_iter.next();
                }
                (None, Some((sk, pending))) => {
                    if matches!(pending, Pending::Put { .. }) {
                        out.push(sk.clone());
                    }
                    next_shadow = shadow_iter.next();
                }
                (None, None) => break,
            }
        }

        out
    }
}
