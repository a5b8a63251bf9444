//! Response definitions
//!
//! Renders command results as exact response lines.

use std::fmt;

/// A response to write back to the client. `Display` renders the exact
/// newline-terminated wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK`
    Ok,

    /// The value, or `nil` when absent
    Value(Option<String>),

    /// A bare integer (counts, TTL results)
    Int(i64),

    /// One value-or-nil line per requested key
    Values(Vec<Option<String>>),

    /// Matching keys in order, terminated by `END`
    Keys(Vec<String>),

    /// `ERR <tag>`
    Error(&'static str),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => writeln!(f, "OK"),
            Reply::Value(Some(value)) => writeln!(f, "{}", value),
            Reply::Value(None) => writeln!(f, "nil"),
            Reply::Int(n) => writeln!(f, "{}", n),
            Reply::Values(values) => {
                for value in values {
                    match value {
                        Some(v) => writeln!(f, "{}", v)?,
                        None => writeln!(f, "nil")?,
                    }
                }
                Ok(())
            }
            Reply::Keys(keys) => {
                for key in keys {
                    writeln!(f, "{}", key)?;
                }
                writeln!(f, "END")
            }
            Reply::Error(tag) => writeln!(f, "ERR {}", tag),
        }
    }
}
