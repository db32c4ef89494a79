//! Queries for the ingest_history table.

use rusqlite::{params, Connection};
use vigil_core::errors::StoreError;
use vigil_core::types::{IngestOutcome, IngestRecord, RunId};

use super::sqlite_err;

pub fn append(
    conn: &Connection,
    run_id: RunId,
    ingested_at: i64,
    duration_ms: i64,
    outcome: &IngestOutcome,
) -> Result<i64, StoreError> {
    conn.prepare_cached(
        "INSERT INTO ingest_history
           (run_id, ingested_at, duration_ms, total_reports, new_reports,
            unresolved_reports, reopened_reports, resolved_reports,
            off_reports, unavailable_reports)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .map_err(sqlite_err)?
    .execute(params![
        run_id.0,
        ingested_at,
        duration_ms,
        outcome.total as i64,
        outcome.new as i64,
        outcome.unresolved as i64,
        outcome.reopened as i64,
        outcome.resolved as i64,
        outcome.off as i64,
        outcome.unavailable as i64,
    ])
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Ingest records for a run, newest first.
pub fn for_run(conn: &Connection, run_id: RunId) -> Result<Vec<IngestRecord>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, run_id, ingested_at, duration_ms, total_reports, new_reports,
                    unresolved_reports, reopened_reports, resolved_reports,
                    off_reports, unavailable_reports
             FROM ingest_history WHERE run_id = ?1
             ORDER BY ingested_at DESC, id DESC",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id.0], |row| {
            Ok(IngestRecord {
                id: row.get(0)?,
                run_id: RunId(row.get(1)?),
                ingested_at: row.get(2)?,
                duration_ms: row.get(3)?,
                total: row.get::<_, i64>(4)? as usize,
                new: row.get::<_, i64>(5)? as usize,
                unresolved: row.get::<_, i64>(6)? as usize,
                reopened: row.get::<_, i64>(7)? as usize,
                resolved: row.get::<_, i64>(8)? as usize,
                off: row.get::<_, i64>(9)? as usize,
                unavailable: row.get::<_, i64>(10)? as usize,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
