//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use vigil_core::config::StoreConfig;
use vigil_core::errors::StoreError;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::migrations;

/// Manages the single write connection and the read connection pool.
///
/// All writes serialize on the writer mutex; reads round-robin over the
/// pool and never block writes (WAL). For in-memory databases the pool
/// cannot see the writer's data, so reads fall back to the writer
/// connection.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open a database at the given path, apply pragmas, run migrations.
    pub fn open(path: &Path, config: &StoreConfig) -> Result<Self, StoreError> {
        let busy_timeout_ms = config.effective_busy_timeout_ms();
        let writer = Connection::open(path).map_err(|e| StoreError::SqliteError {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer, busy_timeout_ms)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, config.effective_read_pool_size(), busy_timeout_ms)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(config: &StoreConfig) -> Result<Self, StoreError> {
        let writer = Connection::open_in_memory().map_err(|e| StoreError::SqliteError {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer, config.effective_busy_timeout_ms())?;
        migrations::run_migrations(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut guard = self.writer.lock().map_err(|_| StoreError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&mut guard)
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            // In-memory database: the pool would see a different store.
            None => {
                let guard = self.writer.lock().map_err(|_| StoreError::SqliteError {
                    message: "write lock poisoned".to_string(),
                })?;
                f(&guard)
            }
        }
    }

    /// Run a WAL checkpoint (TRUNCATE mode).
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(|e| StoreError::SqliteError {
                    message: e.to_string(),
                })
        })
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Best effort.
        if let Ok(conn) = self.writer.lock() {
            let _ = pragmas::optimize_on_close(&conn);
        }
    }
}
