//! Queries for tags and their frozen report copies.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StoreError;
use vigil_core::types::{BugId, Report, RunId, Tag, TagId};

use super::reports::{into_report, map_raw};
use super::sqlite_err;

pub fn insert(
    conn: &Connection,
    run_id: RunId,
    name: &str,
    now: i64,
) -> Result<TagId, StoreError> {
    conn.execute(
        "INSERT INTO tags (run_id, name, created_at) VALUES (?1, ?2, ?3)",
        params![run_id.0, name, now],
    )
    .map_err(sqlite_err)?;
    Ok(TagId(conn.last_insert_rowid()))
}

/// Copy the run's current head into the tag, in snapshot order so the fresh
/// row ids preserve it. Returns the number of rows copied.
pub fn copy_head(conn: &Connection, tag_id: TagId, run_id: RunId) -> Result<u64, StoreError> {
    let copied = conn
        .execute(
            "INSERT INTO tag_reports
                (tag_id, bug_id, checker_name, severity, file_path, line, col,
                 message, bug_path_json, detection_status, detected_at, fixed_at)
             SELECT ?1, bug_id, checker_name, severity, file_path, line, col,
                    message, bug_path_json, detection_status, detected_at, fixed_at
             FROM reports WHERE run_id = ?2
             ORDER BY file_path, line, id",
            params![tag_id.0, run_id.0],
        )
        .map_err(sqlite_err)?;
    Ok(copied as u64)
}

pub fn by_id(conn: &Connection, tag_id: TagId) -> Result<Option<Tag>, StoreError> {
    conn.prepare_cached("SELECT id, run_id, name, created_at FROM tags WHERE id = ?1")
        .map_err(sqlite_err)?
        .query_row(params![tag_id.0], map_tag)
        .optional()
        .map_err(sqlite_err)
}

pub fn by_name(conn: &Connection, run_id: RunId, name: &str) -> Result<Option<Tag>, StoreError> {
    conn.prepare_cached(
        "SELECT id, run_id, name, created_at FROM tags WHERE run_id = ?1 AND name = ?2",
    )
    .map_err(sqlite_err)?
    .query_row(params![run_id.0, name], map_tag)
    .optional()
    .map_err(sqlite_err)
}

/// Whether this identity is frozen in any tag of the run.
pub fn identity_in_tags(
    conn: &Connection,
    run_id: RunId,
    bug_id: BugId,
) -> Result<bool, StoreError> {
    conn.prepare_cached(
        "SELECT EXISTS(
            SELECT 1 FROM tag_reports tr
            JOIN tags t ON t.id = tr.tag_id
            WHERE t.run_id = ?1 AND tr.bug_id = ?2)",
    )
    .map_err(sqlite_err)?
    .query_row(params![run_id.0, bug_id.to_hex()], |row| {
        row.get::<_, bool>(0)
    })
    .map_err(sqlite_err)
}

/// All tags of a run, oldest first.
pub fn list(conn: &Connection, run_id: RunId) -> Result<Vec<Tag>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, run_id, name, created_at FROM tags
             WHERE run_id = ?1 ORDER BY created_at, id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![run_id.0], map_tag).map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

pub fn delete(conn: &Connection, tag_id: TagId) -> Result<bool, StoreError> {
    let rows = conn
        .execute("DELETE FROM tags WHERE id = ?1", params![tag_id.0])
        .map_err(sqlite_err)?;
    Ok(rows > 0)
}

/// The frozen report set of a tag, ordered (file_path, line, id).
///
/// Review statuses are live: the join goes against the owning run's current
/// verdicts, not the verdicts at capture time.
pub fn tag_reports(conn: &Connection, tag_id: TagId) -> Result<Vec<Report>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT tr.id, t.run_id, tr.bug_id, tr.checker_name, tr.severity,
                    tr.file_path, tr.line, tr.col, tr.message, tr.bug_path_json,
                    tr.detection_status, tr.detected_at, tr.fixed_at,
                    COALESCE(rs.status, 'unreviewed')
             FROM tag_reports tr
             JOIN tags t ON t.id = tr.tag_id
             LEFT JOIN review_statuses rs
                    ON rs.run_id = t.run_id AND rs.bug_id = tr.bug_id
             WHERE tr.tag_id = ?1
             ORDER BY tr.file_path, tr.line, tr.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![tag_id.0], map_raw)
        .map_err(sqlite_err)?;
    let raw = rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)?;
    raw.into_iter().map(into_report).collect()
}

fn map_tag(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: TagId(row.get(0)?),
        run_id: RunId(row.get(1)?),
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}
