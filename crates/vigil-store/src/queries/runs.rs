//! Queries for the runs table.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::{Run, RunId};

use super::sqlite_err;

/// Look up a run id by name, creating the run if it does not exist.
pub fn get_or_create(conn: &Connection, name: &str, now: i64) -> Result<RunId, StoreError> {
    if let Some(run) = by_name(conn, name)? {
        return Ok(run.id);
    }
    conn.execute(
        "INSERT INTO runs (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![name, now],
    )
    .map_err(sqlite_err)?;
    Ok(RunId(conn.last_insert_rowid()))
}

pub fn by_name(conn: &Connection, name: &str) -> Result<Option<Run>, StoreError> {
    conn.prepare_cached("SELECT id, name, created_at, updated_at FROM runs WHERE name = ?1")
        .map_err(sqlite_err)?
        .query_row(params![name], map_run)
        .optional()
        .map_err(sqlite_err)
}

pub fn by_id(conn: &Connection, id: RunId) -> Result<Option<Run>, StoreError> {
    conn.prepare_cached("SELECT id, name, created_at, updated_at FROM runs WHERE id = ?1")
        .map_err(sqlite_err)?
        .query_row(params![id.0], map_run)
        .optional()
        .map_err(sqlite_err)
}

/// All runs, ordered by name.
pub fn list(conn: &Connection) -> Result<Vec<Run>, StoreError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, created_at, updated_at FROM runs ORDER BY name")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_run).map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn touch_updated_at(conn: &Connection, run_id: RunId, now: i64) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE runs SET updated_at = ?2 WHERE id = ?1",
        params![run_id.0, now],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Delete a run. Reports, tags, review statuses, comments, and ingest
/// history cascade. Returns false when the run did not exist.
pub fn delete(conn: &Connection, run_id: RunId) -> Result<bool, StoreError> {
    let rows = conn
        .execute("DELETE FROM runs WHERE id = ?1", params![run_id.0])
        .map_err(sqlite_err)?;
    Ok(rows > 0)
}

/// Run ids whose head was last updated before the cutoff.
pub fn older_than(conn: &Connection, cutoff: i64) -> Result<Vec<RunId>, StoreError> {
    let mut stmt = conn
        .prepare_cached("SELECT id FROM runs WHERE updated_at < ?1 ORDER BY id")
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![cutoff], |row| row.get::<_, i64>(0).map(RunId))
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<Run> {
    Ok(Run {
        id: RunId(row.get(0)?),
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}
