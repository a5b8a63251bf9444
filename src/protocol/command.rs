//! Command definitions
//!
//! Parses one input line into a command.

use super::Reply;

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bind a key to a value
    Set { key: String, value: String },

    /// Read a key
    Get { key: String },

    /// Remove a key
    Del { key: String },

    /// Check presence of a key
    Exists { key: String },

    /// Set a TTL relative to now, in milliseconds
    Expire { key: String, ms: i64 },

    /// Read the remaining TTL
    Ttl { key: String },

    /// Clear a TTL
    Persist { key: String },

    /// Bind several keys at once
    MSet { pairs: Vec<(String, String)> },

    /// Read several keys at once
    MGet { keys: Vec<String> },

    /// Ordered key scan; `None` bounds are open
    Range {
        lo: Option<String>,
        hi: Option<String>,
    },

    /// Start a transaction
    Begin,

    /// Apply the open transaction
    Commit,

    /// Discard the open transaction
    Abort,

    /// Terminate the session
    Exit,
}

impl Command {
    /// Parse one whitespace-tokenized line. The command word is
    /// case-insensitive; keys and values are taken verbatim.
    pub fn parse(line: &str) -> Result<Command, Reply> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (verb, args) = match tokens.split_first() {
            Some((verb, args)) => (*verb, args),
            None => return Err(Reply::Error("unknown")),
        };

        match verb.to_ascii_uppercase().as_str() {
            "SET" => match args {
                [key, value] => Ok(Command::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "GET" => match args {
                [key] => Ok(Command::Get {
                    key: key.to_string(),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "DEL" => match args {
                [key] => Ok(Command::Del {
                    key: key.to_string(),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "EXISTS" => match args {
                [key] => Ok(Command::Exists {
                    key: key.to_string(),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "EXPIRE" => match args {
                [key, ms] => {
                    let ms: i64 = ms.parse().map_err(|_| Reply::Error("integer"))?;
                    Ok(Command::Expire {
                        key: key.to_string(),
                        ms,
                    })
                }
                _ => Err(Reply::Error("arity")),
            },
            "TTL" => match args {
                [key] => Ok(Command::Ttl {
                    key: key.to_string(),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "PERSIST" => match args {
                [key] => Ok(Command::Persist {
                    key: key.to_string(),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "MSET" => {
                if args.is_empty() || args.len() % 2 != 0 {
                    return Err(Reply::Error("arity"));
                }
                let pairs = args
                    .chunks(2)
                    .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                    .collect();
                Ok(Command::MSet { pairs })
            }
            "MGET" => {
                if args.is_empty() {
                    return Err(Reply::Error("arity"));
                }
                Ok(Command::MGet {
                    keys: args.iter().map(|k| k.to_string()).collect(),
                })
            }
            "RANGE" => match args {
                [lo, hi] => Ok(Command::Range {
                    lo: parse_bound(lo),
                    hi: parse_bound(hi),
                }),
                _ => Err(Reply::Error("arity")),
            },
            "BEGIN" => match args {
                [] => Ok(Command::Begin),
                _ => Err(Reply::Error("arity")),
            },
            "COMMIT" => match args {
                [] => Ok(Command::Commit),
                _ => Err(Reply::Error("arity")),
            },
            "ABORT" => match args {
                [] => Ok(Command::Abort),
                _ => Err(Reply::Error("arity")),
            },
            "EXIT" => match args {
                [] => Ok(Command::Exit),
                _ => Err(Reply::Error("arity")),
            },
            _ => Err(Reply::Error("unknown")),
        }
    }
}

/// `-` denotes an open range bound
fn parse_bound(token: &str) -> Option<String> {
    if token == "-" {
        None
    } else {
        Some(token.to_string())
    }
}
