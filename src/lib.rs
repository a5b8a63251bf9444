//! # loamdb
//!
//! An embedded, single-process, ordered key-value store with:
//! - Append-only log persistence for durability (fsync per write)
//! - Crash recovery with torn-tail truncation
//! - Millisecond-granularity TTLs with lazy expiry
//! - Atomic single-client transactions
//! - Lexicographic range scans over a B+ tree index
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Command Shell (REPL)                      │
//! │                (one command per input line)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │      (write-ahead ordering, lazy expiry, tx overlay)         │
//! └──────┬──────────────────┬──────────────────────┬────────────┘
//!        │                  │                      │
//!        ▼                  ▼                      ▼
//! ┌─────────────┐    ┌─────────────┐       ┌─────────────┐
//! │     Log     │    │    Index    │       │  TTL Table  │
//! │  (append +  │    │  (B+ tree)  │       │ (deadlines) │
//! │   fsync)    │    │             │       │             │
//! └─────────────┘    └─────────────┘       └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod log;
pub mod index;
pub mod ttl;
pub mod engine;
pub mod protocol;
pub mod repl;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LoamError, Result};
pub use config::Config;
pub use clock::Clock;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of loamdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
