//! Protocol Module
//!
//! The line-oriented command protocol spoken on stdin/stdout.
//!
//! ## Commands
//! ```text
//! SET <key> <value>          -> OK
//! GET <key>                  -> value | nil
//! DEL <key>                  -> 1 | 0
//! EXISTS <key>               -> 1 | 0
//! EXPIRE <key> <ms>          -> 1 | 0
//! TTL <key>                  -> remaining ms | -1 (no TTL) | -2 (missing)
//! PERSIST <key>              -> 1 | 0
//! MSET <k1> <v1> [<k2> <v2> ...] -> OK
//! MGET <k1> [<k2> ...]       -> one value-or-nil line per key
//! RANGE <lo> <hi>            -> matching keys, then END ('-' = open bound)
//! BEGIN / COMMIT / ABORT     -> OK
//! EXIT                       -> terminate cleanly
//! ```
//!
//! Errors are a single line: `ERR <tag>`. Unknown commands answer
//! `ERR unknown`.

mod command;
mod response;

pub use command::Command;
pub use response::Reply;
