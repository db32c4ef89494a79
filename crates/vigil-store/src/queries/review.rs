//! Queries for the review_statuses table.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::{BugId, ReviewRecord, ReviewStatus, RunId};

use super::reports::parse_review;
use super::sqlite_err;

/// Set or replace the verdict for one (run, bug identity).
pub fn upsert(
    conn: &Connection,
    run_id: RunId,
    bug_id: BugId,
    status: ReviewStatus,
    author: &str,
    message: Option<&str>,
    now: i64,
) -> Result<(), StoreError> {
    conn.prepare_cached(
        "INSERT INTO review_statuses (run_id, bug_id, status, author, message, changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(run_id, bug_id) DO UPDATE SET
            status = excluded.status,
            author = excluded.author,
            message = excluded.message,
            changed_at = excluded.changed_at",
    )
    .map_err(sqlite_err)?
    .execute(params![
        run_id.0,
        bug_id.to_hex(),
        status.as_str(),
        author,
        message,
        now
    ])
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get(
    conn: &Connection,
    run_id: RunId,
    bug_id: BugId,
) -> Result<Option<ReviewRecord>, StoreError> {
    let raw = conn
        .prepare_cached(
            "SELECT status, author, message, changed_at
             FROM review_statuses WHERE run_id = ?1 AND bug_id = ?2",
        )
        .map_err(sqlite_err)?
        .query_row(params![run_id.0, bug_id.to_hex()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .optional()
        .map_err(sqlite_err)?;

    raw.map(|(status, author, message, changed_at)| {
        Ok(ReviewRecord {
            status: parse_review(&status)?,
            author,
            message,
            changed_at,
        })
    })
    .transpose()
}
