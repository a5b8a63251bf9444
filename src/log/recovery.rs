//! Log Recovery
//!
//! Scans the log at engine open, rebuilding the record sequence and
//! truncating any torn tail left by a crash.
//!
//! ## Recovery rules
//! - A final line missing its newline is torn: truncated, never an error.
//!   A crash mid-append (including mid-batch) always leaves this shape.
//! - A terminated final line that fails to decode (wrong token count,
//!   non-integer deadline) is also treated as torn and truncated.
//! - A malformed line with records after it is corruption: fatal at open.
//! - An unrecognized record tag on a terminated line means the file was
//!   written by an incompatible version: fatal at open.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{LoamError, Result};

use super::record::DecodeError;
use super::Record;

/// Outcome of a recovery scan
#[derive(Debug)]
pub struct RecoveryReport {
    /// Number of valid records recovered
    pub records_recovered: usize,

    /// Bytes removed from the end of the file
    pub truncated_bytes: u64,

    /// Whether a torn tail was truncated
    pub was_truncated: bool,
}

/// Handles log recovery at engine open
pub struct LogRecovery;

impl LogRecovery {
    /// Scan the log file, truncate any torn tail, and return the valid
    /// records in append order.
    ///
    /// A missing file is an empty store, not an error.
    pub fn recover(path: &Path) -> Result<(Vec<Record>, RecoveryReport)> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no log file; starting empty");
            return Ok((
                Vec::new(),
                RecoveryReport {
                    records_recovered: 0,
                    truncated_bytes: 0,
                    was_truncated: false,
                },
            ));
        }

        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = e.utf8_error().valid_up_to();
            let line = e.as_bytes()[..valid].iter().filter(|b| **b == b'\n').count() + 1;
            LoamError::Corruption {
                line,
                reason: "log is not valid UTF-8".to_string(),
            }
        })?;

        let mut records = Vec::new();
        let mut pos = 0usize;
        let mut valid_end = 0usize;
        let mut line_no = 0usize;

        while pos < text.len() {
            let nl = match text[pos..].find('\n') {
                Some(i) => pos + i,
                // Unterminated tail: always torn, even if it would decode.
                None => break,
            };
            line_no += 1;
            let line = &text[pos..nl];
            let is_last = nl + 1 >= text.len();

            match Record::decode(line) {
                Ok(record) => {
                    records.push(record);
                    valid_end = nl + 1;
                }
                Err(DecodeError::Malformed(reason)) if is_last => {
                    tracing::warn!(line = line_no, reason, "malformed final record; treating as torn");
                    break;
                }
                Err(DecodeError::Malformed(reason)) => {
                    return Err(LoamError::Corruption {
                        line: line_no,
                        reason: reason.to_string(),
                    });
                }
                Err(DecodeError::UnknownTag(tag)) => {
                    return Err(LoamError::UnknownRecord { line: line_no, tag });
                }
            }
            pos = nl + 1;
        }

        let truncated_bytes = (text.len() - valid_end) as u64;
        let was_truncated = truncated_bytes > 0;

        if was_truncated {
            tracing::warn!(
                path = %path.display(),
                truncated_bytes,
                "torn tail detected; rewinding log to last valid record"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_end as u64)?;
            file.sync_all()?;
        }

        let records_recovered = records.len();
        tracing::debug!(
            path = %path.display(),
            records = records_recovered,
            was_truncated,
            "log recovery complete"
        );

        Ok((
            records,
            RecoveryReport {
                records_recovered,
                truncated_bytes,
                was_truncated,
            },
        ))
    }
}
