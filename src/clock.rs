//! Time source for TTL decisions.
//!
//! The engine never reads the system clock directly; it is handed a `Clock`
//! at construction. Tests substitute a manually driven clock so expiry can be
//! exercised deterministically.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of wall-clock milliseconds since the Unix epoch.
#[derive(Clone)]
pub struct Clock {
    source: Source,
}

#[derive(Clone)]
enum Source {
    System,
    Manual(Arc<AtomicI64>),
}

impl Clock {
    /// The real system clock.
    pub fn system() -> Self {
        Clock {
            source: Source::System,
        }
    }

    /// A manually driven clock starting at `start_ms`, plus a handle that can
    /// advance it.
    pub fn manual(start_ms: i64) -> (Self, ManualClock) {
        let cell = Arc::new(AtomicI64::new(start_ms));
        let clock = Clock {
            source: Source::Manual(Arc::clone(&cell)),
        };
        (clock, ManualClock { cell })
    }

    /// Current time in milliseconds.
    pub fn now_ms(&self) -> i64 {
        match &self.source {
            Source::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0),
            Source::Manual(cell) => cell.load(Ordering::Relaxed),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::System => write!(f, "Clock::System"),
            Source::Manual(cell) => {
                write!(f, "Clock::Manual({})", cell.load(Ordering::Relaxed))
            }
        }
    }
}

/// Handle controlling a `Clock::manual` instance.
#[derive(Clone)]
pub struct ManualClock {
    cell: Arc<AtomicI64>,
}

impl ManualClock {
    /// Move the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: i64) {
        self.cell.fetch_add(delta_ms, Ordering::Relaxed);
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, now_ms: i64) {
        self.cell.store(now_ms, Ordering::Relaxed);
    }

    /// Read the clock without going through the engine.
    pub fn now_ms(&self) -> i64 {
        self.cell.load(Ordering::Relaxed)
    }
}
