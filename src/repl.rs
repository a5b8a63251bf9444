//! Interactive shell
//!
//! Reads one command per line, executes exactly one engine operation per
//! command, and writes the exact response lines. Generic over the input and
//! output streams so tests can drive it with in-memory buffers.

use std::io::{BufRead, Write};

use crate::engine::Engine;
use crate::error::{LoamError, Result};
use crate::protocol::{Command, Reply};

/// Run the command loop until EOF or `EXIT`.
///
/// EOF with an open transaction is an implicit abort: the buffer is dropped
/// and nothing reaches the log.
pub fn run(engine: &mut Engine, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(reply) => {
                write!(output, "{}", reply)?;
                output.flush()?;
                continue;
            }
        };

        if command == Command::Exit {
            break;
        }

        let reply = execute(engine, command);
        write!(output, "{}", reply)?;
        output.flush()?;
    }

    if engine.in_tx() {
        engine.abort()?;
    }
    Ok(())
}

/// Execute one command, mapping engine errors onto protocol error tags.
/// State and syntax errors never touch durable state; an I/O failure aborts
/// only the current command.
fn execute(engine: &mut Engine, command: Command) -> Reply {
    match try_execute(engine, command) {
        Ok(reply) => reply,
        Err(LoamError::TransactionActive) => Reply::Error("tx-active"),
        Err(LoamError::NoTransaction) => Reply::Error("no-tx"),
        Err(LoamError::Io(e)) => {
            tracing::error!(error = %e, "append failed");
            Reply::Error("io")
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            Reply::Error("internal")
        }
    }
}

fn try_execute(engine: &mut Engine, command: Command) -> Result<Reply> {
    Ok(match command {
        Command::Set { key, value } => {
            engine.set(&key, &value)?;
            Reply::Ok
        }
        Command::Get { key } => Reply::Value(engine.get(&key)?),
        Command::Del { key } => Reply::Int(engine.del(&key)? as i64),
        Command::Exists { key } => Reply::Int(engine.exists(&key)? as i64),
        Command::Expire { key, ms } => Reply::Int(engine.expire(&key, ms)? as i64),
        Command::Ttl { key } => Reply::Int(engine.ttl(&key)?),
        Command::Persist { key } => Reply::Int(engine.persist(&key)? as i64),
        Command::MSet { pairs } => {
            engine.mset(&pairs)?;
            Reply::Ok
        }
        Command::MGet { keys } => Reply::Values(engine.mget(&keys)?),
        Command::Range { lo, hi } => Reply::Keys(engine.range(lo.as_deref(), hi.as_deref())?),
        Command::Begin => {
            engine.begin()?;
            Reply::Ok
        }
        Command::Commit => {
            engine.commit()?;
            Reply::Ok
        }
        Command::Abort => {
            engine.abort()?;
            Reply::Ok
        }
        // EXIT never reaches here; the loop terminates on it.
        Command::Exit => Reply::Ok,
    })
}
