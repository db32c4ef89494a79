//! Write connection utilities — BEGIN IMMEDIATE transactions.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use vigil_core::errors::StoreError;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, preventing SQLITE_BUSY
/// upgrades mid-transaction. Rolls back automatically if the closure errors.
pub fn with_immediate_transaction<F, T>(conn: &mut Connection, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| StoreError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StoreError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}

/// Like [`with_immediate_transaction`], but reports a busy begin as
/// `Ok(None)` so callers can retry with their own backoff policy.
pub fn try_immediate_transaction<F, T>(
    conn: &mut Connection,
    f: F,
) -> Result<Option<T>, StoreError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
{
    let tx = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
        Ok(tx) => tx,
        Err(e) if is_busy(&e) => return Ok(None),
        Err(e) => {
            return Err(StoreError::SqliteError {
                message: format!("failed to begin immediate transaction: {e}"),
            })
        }
    };

    let result = f(&tx)?;

    tx.commit().map_err(|e| StoreError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(Some(result))
}

/// True when another connection holds a conflicting lock.
pub fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}
