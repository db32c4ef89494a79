//! Per-table query modules. Pure SQL + row mapping, no policy.

pub mod comments;
pub mod components;
pub mod ingest_history;
pub mod reports;
pub mod review;
pub mod runs;
pub mod tags;

use vigil_core::errors::StoreError;

/// Map a rusqlite error into the store error space.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::SqliteError {
        message: e.to_string(),
    }
}
