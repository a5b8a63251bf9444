//! Configuration for loamdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::clock::Clock;

/// Main configuration for a loamdb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Log Configuration
    // -------------------------------------------------------------------------
    /// Path of the append-only log file
    pub log_path: PathBuf,

    // -------------------------------------------------------------------------
    // Time Configuration
    // -------------------------------------------------------------------------
    /// Time source consulted for TTL decisions
    pub clock: Clock,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("data.db"),
            clock: Clock::system(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log file path
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    /// Set the time source
    pub fn clock(mut self, clock: Clock) -> Self {
        self.config.clock = clock;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
