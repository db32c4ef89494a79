//! Report-store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the store subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Read-only connection pool size. Default: 4.
    pub read_pool_size: Option<usize>,
    /// Retries for a write transaction that cannot begin because the
    /// database is busy. Default: 3.
    pub busy_retries: Option<u32>,
    /// SQLite busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: Option<u64>,
}

impl StoreConfig {
    /// Returns the effective read pool size, defaulting to 4.
    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(4)
    }

    /// Returns the effective busy retry bound, defaulting to 3.
    pub fn effective_busy_retries(&self) -> u32 {
        self.busy_retries.unwrap_or(3)
    }

    /// Returns the effective busy timeout, defaulting to 5000 ms.
    pub fn effective_busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(5_000)
    }
}
