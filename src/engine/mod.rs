//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Rebuild index and TTL state by replaying the log at open
//! - Enforce write-ahead ordering: append (and fsync) before any in-memory
//!   mutation, so every visible change is already durable
//! - Materialize TTL expiry lazily on access (synthetic DEL)
//! - Route reads and writes through the transaction overlay when one is open
//!
//! Reads never mutate application-visible state except for expiry
//! materialization.

mod tx;

use std::path::Path;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{LoamError, Result};
use crate::index::BPlusTree;
use crate::log::{LogRecovery, LogWriter, Record};
use crate::ttl::{TtlState, TtlTable};

use tx::{Pending, TtlAction, TxBuffer};

/// The main storage engine
#[derive(Debug)]
pub struct Engine {
    /// Durable record stream; the sole authority on state
    log: LogWriter,

    /// Ordered map of live keys
    index: BPlusTree,

    /// Absolute expiration deadlines for a subset of live keys
    ttl: TtlTable,

    /// Injected time source
    clock: Clock,

    /// Overlay for the active transaction, if any
    tx: Option<TxBuffer>,
}

impl Engine {
    /// Open or create an engine with the given config.
    ///
    /// Recovery scans the log (truncating any torn tail), replays every
    /// record into the index and TTL table without re-logging, and leaves
    /// elapsed deadlines in place for the next access to materialize.
    pub fn open(config: Config) -> Result<Self> {
        let (records, report) = LogRecovery::recover(&config.log_path)?;

        let mut index = BPlusTree::new();
        let mut ttl = TtlTable::new();
        for record in &records {
            apply_to_state(&mut index, &mut ttl, record);
        }

        let log = LogWriter::open(&config.log_path)?;

        tracing::info!(
            path = %config.log_path.display(),
            replayed = report.records_recovered,
            truncated = report.was_truncated,
            keys = index.len(),
            deadlines = ttl.len(),
            "engine opened"
        );

        Ok(Engine {
            log,
            index,
            ttl,
            clock: config.clock,
            tx: None,
        })
    }

    /// Open with a log path and the system clock (convenience method)
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::builder().log_path(path.as_ref()).build())
    }

    /// Whether a transaction is active
    pub fn in_tx(&self) -> bool {
        self.tx.is_some()
    }

    /// Number of live keys in the index
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    // -------------------------------------------------------------------------
    // Point reads
    // -------------------------------------------------------------------------

    /// Latest value for a key, or `None` if missing, deleted, or expired
    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now_ms();
        if let Some(tx) = &self.tx {
            if let Some(view) = tx.value_view(key) {
                return Ok(view.map(|v| v.to_string()));
            }
        }
        self.base_get(key, now)
    }

    /// Whether a key exists (not deleted, not expired)
    pub fn exists(&mut self, key: &str) -> Result<bool> {
        let now = self.clock.now_ms();
        self.view_exists(key, now)
    }

    /// Values for several keys, order preserved, `None` per missing key
    pub fn mget(&mut self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.get(key)?);
        }
        Ok(out)
    }

    /// Remaining TTL in ms; `-1` if the key has no TTL, `-2` if the key is
    /// missing or expired
    pub fn ttl(&mut self, key: &str) -> Result<i64> {
        let now = self.clock.now_ms();

        let mut cleared_in_tx = false;
        if let Some(tx) = &self.tx {
            match tx.pending(key) {
                Some(Pending::Tombstone) => return Ok(-2),
                Some(Pending::Put {
                    ttl: TtlAction::Set(deadline),
                    ..
                })
                | Some(Pending::TtlOnly(TtlAction::Set(deadline))) => {
                    let deadline = *deadline;
                    return Ok(if deadline > now { deadline - now } else { -2 });
                }
                // A pending SET is a fresh binding with no TTL.
                Some(Pending::Put {
                    ttl: TtlAction::Clear,
                    ..
                }) => return Ok(-1),
                Some(Pending::TtlOnly(TtlAction::Clear)) => cleared_in_tx = true,
                None => {}
            }
        }

        if self.expire_if_due(key, now)? {
            return Ok(-2);
        }
        if !self.index.contains(key) {
            return Ok(-2);
        }
        if cleared_in_tx {
            return Ok(-1);
        }
        match self.ttl.deadline(key) {
            None => Ok(-1),
            // expire_if_due already handled elapsed deadlines, so this is > 0.
            Some(deadline) => Ok(deadline - now),
        }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Bind a key to a value. A fresh SET is a new binding: any existing TTL
    /// is cleared.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(tx) = &mut self.tx {
            tx.stage_set(key.to_string(), value.to_string());
            return Ok(());
        }

        self.log.append(&Record::Set {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        self.index.put(key.to_string(), value.to_string());
        self.ttl.clear(key);
        Ok(())
    }

    /// Remove a key. Returns whether it was present.
    pub fn del(&mut self, key: &str) -> Result<bool> {
        let now = self.clock.now_ms();

        if self.tx.is_some() {
            let existed = self.view_exists(key, now)?;
            if existed {
                if let Some(tx) = &mut self.tx {
                    tx.stage_del(key);
                }
            }
            return Ok(existed);
        }

        if self.expire_if_due(key, now)? {
            return Ok(false);
        }
        if !self.index.contains(key) {
            return Ok(false);
        }

        self.log.append(&Record::Del {
            key: key.to_string(),
        })?;
        self.index.delete(key);
        self.ttl.clear(key);
        Ok(true)
    }

    /// Set a TTL of `rel_ms` from now. Returns `false` if the key is missing
    /// or expired. A non-positive `rel_ms` expires the key immediately (the
    /// next access materializes it).
    pub fn expire(&mut self, key: &str, rel_ms: i64) -> Result<bool> {
        let now = self.clock.now_ms();
        let deadline = now.saturating_add(rel_ms);

        if self.tx.is_some() {
            if !self.view_exists(key, now)? {
                return Ok(false);
            }
            if let Some(tx) = &mut self.tx {
                tx.stage_expire(key, deadline);
            }
            return Ok(true);
        }

        if self.expire_if_due(key, now)? {
            return Ok(false);
        }
        if !self.index.contains(key) {
            return Ok(false);
        }

        self.log.append(&Record::ExpireAt {
            key: key.to_string(),
            deadline_ms: deadline,
        })?;
        self.ttl.set(key.to_string(), deadline);
        Ok(true)
    }

    /// Clear a key's TTL, keeping its value. Returns `true` only if a TTL
    /// was actually removed; nothing is logged otherwise.
    pub fn persist(&mut self, key: &str) -> Result<bool> {
        let now = self.clock.now_ms();

        if self.tx.is_some() {
            if !self.view_has_ttl(key, now)? {
                return Ok(false);
            }
            if let Some(tx) = &mut self.tx {
                tx.stage_persist(key);
            }
            return Ok(true);
        }

        if self.expire_if_due(key, now)? {
            return Ok(false);
        }
        if !self.index.contains(key) {
            return Ok(false);
        }
        if self.ttl.deadline(key).is_none() {
            return Ok(false);
        }

        self.log.append(&Record::Persist {
            key: key.to_string(),
        })?;
        self.ttl.clear(key);
        Ok(true)
    }

    /// Bind several keys at once. Durability is all-or-nothing: the records
    /// go to the log as one batch with a single fsync before any index
    /// update, and a torn batch is erased by recovery.
    pub fn mset(&mut self, pairs: &[(String, String)]) -> Result<()> {
        if let Some(tx) = &mut self.tx {
            for (key, value) in pairs {
                tx.stage_set(key.clone(), value.clone());
            }
            return Ok(());
        }

        let records: Vec<Record> = pairs
            .iter()
            .map(|(key, value)| Record::Set {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        self.log.append_batch(&records)?;

        for (key, value) in pairs {
            self.index.put(key.clone(), value.clone());
            self.ttl.clear(key);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Range scans
    // -------------------------------------------------------------------------

    /// Keys in `lo ≤ key ≤ hi`, ascending. Either bound may be `None`.
    /// Expired keys encountered by the scan are materialized and skipped;
    /// with a transaction open, pending puts appear and pending deletes are
    /// suppressed.
    pub fn range(&mut self, lo: Option<&str>, hi: Option<&str>) -> Result<Vec<String>> {
        let now = self.clock.now_ms();

        if let (Some(lo), Some(hi)) = (lo, hi) {
            if lo > hi {
                return Ok(Vec::new());
            }
        }

        let candidates: Vec<String> = self
            .index
            .range(lo, hi)
            .map(|(key, _)| key.to_string())
            .collect();

        let mut base = Vec::with_capacity(candidates.len());
        for key in candidates {
            if !self.expire_if_due(&key, now)? {
                base.push(key);
            }
        }

        match &self.tx {
            Some(tx) => Ok(tx.merge_keys(base, lo, hi)),
            None => Ok(base),
        }
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    /// Start buffering writes. Nested transactions are not supported.
    pub fn begin(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return Err(LoamError::TransactionActive);
        }
        self.tx = Some(TxBuffer::new());
        Ok(())
    }

    /// Apply the buffered writes atomically: the whole journal is appended
    /// as one batch (one fsync) before any of it becomes visible. If the
    /// append fails, the overlay is retained so the client can retry or
    /// abort.
    pub fn commit(&mut self) -> Result<()> {
        let buffered = match &self.tx {
            Some(tx) => {
                self.log.append_batch(tx.journal())?;
                tx.journal().len()
            }
            None => return Err(LoamError::NoTransaction),
        };

        if let Some(tx) = self.tx.take() {
            for record in tx.into_journal() {
                self.apply_record(&record);
            }
        }

        tracing::debug!(records = buffered, "transaction committed");
        Ok(())
    }

    /// Discard the buffered writes. Durable state is untouched.
    pub fn abort(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(_) => {
                tracing::debug!("transaction aborted");
                Ok(())
            }
            None => Err(LoamError::NoTransaction),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn base_get(&mut self, key: &str, now: i64) -> Result<Option<String>> {
        if self.expire_if_due(key, now)? {
            return Ok(None);
        }
        Ok(self.index.get(key).map(|v| v.to_string()))
    }

    /// Materialize expiry if the key's deadline has elapsed: append a
    /// synthetic DEL (durability first), then drop the key from index and
    /// TTL. Safe to repeat; a second access finds the key already gone.
    fn expire_if_due(&mut self, key: &str, now: i64) -> Result<bool> {
        match self.ttl.check(key, now) {
            TtlState::Expired => {
                self.log.append(&Record::Del {
                    key: key.to_string(),
                })?;
                self.index.delete(key);
                self.ttl.clear(key);
                tracing::debug!(key, "materialized expiry");
                Ok(true)
            }
            TtlState::NoTtl | TtlState::Alive { .. } => Ok(false),
        }
    }

    /// Key existence under the transaction view (shadow over base)
    fn view_exists(&mut self, key: &str, now: i64) -> Result<bool> {
        if let Some(tx) = &self.tx {
            if let Some(view) = tx.value_view(key) {
                return Ok(view.is_some());
            }
        }
        if self.expire_if_due(key, now)? {
            return Ok(false);
        }
        Ok(self.index.contains(key))
    }

    /// Whether the transaction view has a TTL that PERSIST could clear
    fn view_has_ttl(&mut self, key: &str, now: i64) -> Result<bool> {
        if let Some(tx) = &self.tx {
            match tx.pending(key) {
                Some(Pending::Tombstone) => return Ok(false),
                Some(Pending::Put {
                    ttl: TtlAction::Set(_),
                    ..
                })
                | Some(Pending::TtlOnly(TtlAction::Set(_))) => return Ok(true),
                Some(Pending::Put {
                    ttl: TtlAction::Clear,
                    ..
                })
                | Some(Pending::TtlOnly(TtlAction::Clear)) => return Ok(false),
                None => {}
            }
        }
        if self.expire_if_due(key, now)? {
            return Ok(false);
        }
        if !self.index.contains(key) {
            return Ok(false);
        }
        Ok(self.ttl.deadline(key).is_some())
    }

    /// Apply one committed record to the in-memory state (already durable)
    fn apply_record(&mut self, record: &Record) {
        apply_to_state(&mut self.index, &mut self.ttl, record);
    }
}

/// Replay policy, shared by recovery replay and commit application:
/// - SET upserts and clears TTL (a SET is always a fresh binding)
/// - DEL removes key and TTL
/// - EXPIREAT applies only to indexed keys (stale records are ignored)
/// - PERSIST clears any TTL
fn apply_to_state(index: &mut BPlusTree, ttl: &mut TtlTable, record: &Record) {
    match record {
        Record::Set { key, value } => {
            index.put(key.clone(), value.clone());
            ttl.clear(key);
        }
        Record::Del { key } => {
            index.delete(key);
            ttl.clear(key);
        }
        Record::ExpireAt { key, deadline_ms } => {
            if index.contains(key) {
                ttl.set(key.clone(), *deadline_ms);
            }
        }
        Record::Persist { key } => {
            ttl.clear(key);
        }
    }
}
