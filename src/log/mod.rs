//! Append-Only Log Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record for every state-changing event before any mutation
//! - Force records to durable storage (fsync) before acknowledging
//! - Batched appends with a single fsync for atomic multi-record writes
//! - Crash recovery with torn-tail truncation
//!
//! ## File Format
//! One record per text line, whitespace-separated tokens, newline-terminated:
//! ```text
//! SET <key> <value>
//! DEL <key>
//! EXPIREAT <key> <deadline_ms>
//! PERSIST <key>
//! ```
//! Keys and values are single tokens at this layer (no embedded whitespace).
//! A crash mid-append leaves an unterminated final line; recovery rewinds the
//! file to the last valid newline boundary, which also makes batched appends
//! all-or-nothing.

mod record;
mod writer;
mod reader;
mod recovery;

pub use record::{DecodeError, Record};
pub use writer::LogWriter;
pub use reader::{LogReader, RecordIter};
pub use recovery::{LogRecovery, RecoveryReport};
