//! Error types for loamdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LoamError
pub type Result<T> = std::result::Result<T, LoamError>;

/// Unified error type for loamdb operations
#[derive(Debug, Error)]
pub enum LoamError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    /// A malformed record before the end of the log. Torn tails are truncated
    /// during recovery instead of raising this.
    #[error("log corruption at line {line}: {reason}")]
    Corruption { line: usize, reason: String },

    /// A record whose leading tag is not SET/DEL/EXPIREAT/PERSIST, i.e. a log
    /// written by an incompatible version.
    #[error("unrecognized record tag {tag:?} at line {line}")]
    UnknownRecord { line: usize, tag: String },

    /// A record that cannot be encoded (key or value violating the
    /// single-token framing).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    // -------------------------------------------------------------------------
    // Transaction Errors
    // -------------------------------------------------------------------------
    #[error("transaction already in progress")]
    TransactionActive,

    #[error("no transaction in progress")]
    NoTransaction,
}
