//! Queries for the comments table.

use rusqlite::{params, Connection};
use vigil_core::errors::StoreError;
use vigil_core::types::{BugId, Comment, RunId};

use super::sqlite_err;

pub fn insert(
    conn: &Connection,
    run_id: RunId,
    bug_id: BugId,
    author: &str,
    message: &str,
    now: i64,
) -> Result<i64, StoreError> {
    conn.prepare_cached(
        "INSERT INTO comments (run_id, bug_id, author, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .map_err(sqlite_err)?
    .execute(params![run_id.0, bug_id.to_hex(), author, message, now])
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Comments on one identity within a run, oldest first.
pub fn for_bug(conn: &Connection, run_id: RunId, bug_id: BugId) -> Result<Vec<Comment>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, author, message, created_at
             FROM comments WHERE run_id = ?1 AND bug_id = ?2
             ORDER BY created_at, id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id.0, bug_id.to_hex()], |row| {
            Ok(Comment {
                id: row.get(0)?,
                author: row.get(1)?,
                message: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn delete(conn: &Connection, comment_id: i64) -> Result<bool, StoreError> {
    let rows = conn
        .execute("DELETE FROM comments WHERE id = ?1", params![comment_id])
        .map_err(sqlite_err)?;
    Ok(rows > 0)
}
