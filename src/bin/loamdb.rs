//! loamdb Binary
//!
//! Runs the command shell against a log file: commands on stdin, responses
//! on stdout. Diagnostics go to stderr so the response stream stays clean.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use loamdb::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// loamdb shell
#[derive(Parser, Debug)]
#[command(name = "loamdb")]
#[command(about = "Embedded ordered key-value store with TTLs and transactions")]
#[command(version)]
struct Args {
    /// Path of the append-only log file
    #[arg(default_value = "data.db")]
    db: PathBuf,
}

fn main() {
    // Quiet by default; RUST_LOG=loamdb=debug surfaces engine internals.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder().log_path(&args.db).build();
    let mut engine = match Engine::open(config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(path = %args.db.display(), "failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = loamdb::repl::run(&mut engine, stdin.lock(), stdout.lock()) {
        tracing::error!("session ended with error: {}", e);
        std::process::exit(1);
    }
}
