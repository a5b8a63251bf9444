//! Log record definitions
//!
//! Defines the four record kinds and their line encoding.

use std::fmt;

use crate::error::{LoamError, Result};

/// A single record in the append-only log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Bind a key to a value
    Set { key: String, value: String },

    /// Remove a key (also written synthetically when expiry materializes)
    Del { key: String },

    /// Set an absolute expiration deadline, in ms since the Unix epoch
    ExpireAt { key: String, deadline_ms: i64 },

    /// Clear any expiration deadline
    Persist { key: String },
}

/// Why a line failed to decode.
///
/// Recovery treats these differently: a malformed final line is a torn tail
/// and is truncated, while an unrecognized tag means the log was written by
/// an incompatible version and is always fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Leading token is not one of the four known tags
    UnknownTag(String),

    /// Known tag but wrong token count, or a non-integer deadline
    Malformed(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownTag(tag) => write!(f, "unrecognized tag {:?}", tag),
            DecodeError::Malformed(reason) => write!(f, "{}", reason),
        }
    }
}

/// A key or value must be a single non-empty token with no whitespace,
/// so that it round-trips through the line format.
fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.contains(char::is_whitespace)
}

impl Record {
    /// The key this record touches
    pub fn key(&self) -> &str {
        match self {
            Record::Set { key, .. }
            | Record::Del { key }
            | Record::ExpireAt { key, .. }
            | Record::Persist { key } => key,
        }
    }

    /// Encode as a single line, without the trailing newline.
    ///
    /// Fails if the key or value would break the single-token framing.
    pub fn encode(&self) -> Result<String> {
        match self {
            Record::Set { key, value } => {
                if !is_token(key) {
                    return Err(LoamError::InvalidRecord(format!("bad key {:?}", key)));
                }
                if !is_token(value) {
                    return Err(LoamError::InvalidRecord(format!("bad value {:?}", value)));
                }
                Ok(format!("SET {} {}", key, value))
            }
            Record::Del { key } => {
                if !is_token(key) {
                    return Err(LoamError::InvalidRecord(format!("bad key {:?}", key)));
                }
                Ok(format!("DEL {}", key))
            }
            Record::ExpireAt { key, deadline_ms } => {
                if !is_token(key) {
                    return Err(LoamError::InvalidRecord(format!("bad key {:?}", key)));
                }
                Ok(format!("EXPIREAT {} {}", key, deadline_ms))
            }
            Record::Persist { key } => {
                if !is_token(key) {
                    return Err(LoamError::InvalidRecord(format!("bad key {:?}", key)));
                }
                Ok(format!("PERSIST {}", key))
            }
        }
    }

    /// Decode a single line (no trailing newline).
    pub fn decode(line: &str) -> std::result::Result<Record, DecodeError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let tag = match tokens.first() {
            Some(t) => *t,
            None => return Err(DecodeError::Malformed("empty line")),
        };

        match tag {
            "SET" => {
                if tokens.len() != 3 {
                    return Err(DecodeError::Malformed("SET expects 3 tokens"));
                }
                Ok(Record::Set {
                    key: tokens[1].to_string(),
                    value: tokens[2].to_string(),
                })
            }
            "DEL" => {
                if tokens.len() != 2 {
                    return Err(DecodeError::Malformed("DEL expects 2 tokens"));
                }
                Ok(Record::Del {
                    key: tokens[1].to_string(),
                })
            }
            "EXPIREAT" => {
                if tokens.len() != 3 {
                    return Err(DecodeError::Malformed("EXPIREAT expects 3 tokens"));
                }
                let deadline_ms: i64 = tokens[2]
                    .parse()
                    .map_err(|_| DecodeError::Malformed("EXPIREAT deadline is not an integer"))?;
                Ok(Record::ExpireAt {
                    key: tokens[1].to_string(),
                    deadline_ms,
                })
            }
            "PERSIST" => {
                if tokens.len() != 2 {
                    return Err(DecodeError::Malformed("PERSIST expects 2 tokens"));
                }
                Ok(Record::Persist {
                    key: tokens[1].to_string(),
                })
            }
            other => Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}
