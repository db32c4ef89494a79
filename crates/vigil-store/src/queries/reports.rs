//! Queries for the reports table (run heads).
//!
//! Reports are read joined against `review_statuses`, so a verdict entered
//! before or after any ingest is always visible on the current rows. Rows
//! come back in (file_path, line, id) order; every snapshot reader relies
//! on that order being stable.

use rusqlite::{params, Connection};
use vigil_core::errors::StoreError;
use vigil_core::types::{
    BugId, BugPath, DetectionStatus, Report, ReportDraft, ReviewStatus, RunId, Severity,
};

use super::sqlite_err;

/// One head row as seen by the ingest pipeline: identity and location only,
/// no payload.
#[derive(Debug, Clone)]
pub struct PrevRow {
    pub id: i64,
    pub bug_id: BugId,
    pub checker_name: String,
    pub file_path: String,
    pub line: u32,
    pub detection_status: DetectionStatus,
    pub detected_at: i64,
}

const REPORT_COLUMNS: &str = "r.id, r.run_id, r.bug_id, r.checker_name, r.severity, \
     r.file_path, r.line, r.col, r.message, r.bug_path_json, r.detection_status, \
     r.detected_at, r.fixed_at, COALESCE(rs.status, 'unreviewed')";

/// The full current head of a run, ordered (file_path, line, id).
pub fn head_reports(conn: &Connection, run_id: RunId) -> Result<Vec<Report>, StoreError> {
    let sql = format!(
        "SELECT {REPORT_COLUMNS}
         FROM reports r
         LEFT JOIN review_statuses rs
                ON rs.run_id = r.run_id AND rs.bug_id = r.bug_id
         WHERE r.run_id = ?1
         ORDER BY r.file_path, r.line, r.id"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id.0], map_raw)
        .map_err(sqlite_err)?;
    let raw = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;
    raw.into_iter().map(into_report).collect()
}

/// Identity view of the current head, for detection-status reconciliation.
pub fn identity_snapshot(conn: &Connection, run_id: RunId) -> Result<Vec<PrevRow>, StoreError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, bug_id, checker_name, file_path, line, detection_status, detected_at
             FROM reports WHERE run_id = ?1
             ORDER BY file_path, line, id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id.0], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })
        .map_err(sqlite_err)?;

    let raw = rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)?;
    raw.into_iter()
        .map(|(id, bug_id, checker_name, file_path, line, status, detected_at)| {
            Ok(PrevRow {
                id,
                bug_id: parse_bug_id(&bug_id)?,
                checker_name,
                file_path,
                line,
                detection_status: parse_detection(&status)?,
                detected_at,
            })
        })
        .collect()
}

/// Insert a fresh head row. Returns the row id.
pub fn insert(
    conn: &Connection,
    run_id: RunId,
    bug_id: BugId,
    draft: &ReportDraft,
    status: DetectionStatus,
    detected_at: i64,
) -> Result<i64, StoreError> {
    let bug_path_json = encode_bug_path(&draft.bug_path)?;
    conn.prepare_cached(
        "INSERT INTO reports
            (run_id, bug_id, checker_name, severity, file_path, line, col,
             message, bug_path_json, detection_status, detected_at, fixed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL)",
    )
    .map_err(sqlite_err)?
    .execute(params![
        run_id.0,
        bug_id.to_hex(),
        draft.checker_name,
        draft.severity.as_str(),
        draft.file_path,
        draft.line,
        draft.column,
        draft.message,
        bug_path_json,
        status.as_str(),
        detected_at,
    ])
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite a matched row's payload with this ingest's content and put it
/// back into detection. Clears fixed_at.
pub fn refresh(
    conn: &Connection,
    report_id: i64,
    draft: &ReportDraft,
    status: DetectionStatus,
    detected_at: i64,
) -> Result<(), StoreError> {
    let bug_path_json = encode_bug_path(&draft.bug_path)?;
    conn.prepare_cached(
        "UPDATE reports SET
            checker_name = ?2, severity = ?3, file_path = ?4, line = ?5, col = ?6,
            message = ?7, bug_path_json = ?8, detection_status = ?9,
            detected_at = ?10, fixed_at = NULL
         WHERE id = ?1",
    )
    .map_err(sqlite_err)?
    .execute(params![
        report_id,
        draft.checker_name,
        draft.severity.as_str(),
        draft.file_path,
        draft.line,
        draft.column,
        draft.message,
        bug_path_json,
        status.as_str(),
        detected_at,
    ])
    .map_err(sqlite_err)?;
    Ok(())
}

/// Move a vanished row out of detection. Keeps the old payload; fixed_at is
/// stamped only if it was not already set.
pub fn mark_absent(
    conn: &Connection,
    report_id: i64,
    status: DetectionStatus,
    now: i64,
) -> Result<(), StoreError> {
    conn.prepare_cached(
        "UPDATE reports SET detection_status = ?2, fixed_at = COALESCE(fixed_at, ?3)
         WHERE id = ?1",
    )
    .map_err(sqlite_err)?
    .execute(params![report_id, status.as_str(), now])
    .map_err(sqlite_err)?;
    Ok(())
}

/// Delete surplus head rows by id.
pub fn delete_many(conn: &Connection, ids: &[i64]) -> Result<(), StoreError> {
    let mut stmt = conn
        .prepare_cached("DELETE FROM reports WHERE id = ?1")
        .map_err(sqlite_err)?;
    for id in ids {
        stmt.execute(params![id]).map_err(sqlite_err)?;
    }
    Ok(())
}

/// Whether this identity has ever appeared in the run's head.
pub fn identity_in_head(
    conn: &Connection,
    run_id: RunId,
    bug_id: BugId,
) -> Result<bool, StoreError> {
    conn.prepare_cached("SELECT EXISTS(SELECT 1 FROM reports WHERE run_id = ?1 AND bug_id = ?2)")
        .map_err(sqlite_err)?
        .query_row(params![run_id.0, bug_id.to_hex()], |row| {
            row.get::<_, bool>(0)
        })
        .map_err(sqlite_err)
}

// ─── Row mapping shared with tag snapshots ──────────────────────────────

/// Raw row shape common to `reports` and `tag_reports` selects.
pub(crate) struct RawReportRow {
    pub id: i64,
    pub run_id: i64,
    pub bug_id: String,
    pub checker_name: String,
    pub severity: String,
    pub file_path: String,
    pub line: u32,
    pub col: u32,
    pub message: String,
    pub bug_path_json: String,
    pub detection_status: String,
    pub detected_at: i64,
    pub fixed_at: Option<i64>,
    pub review_status: String,
}

pub(crate) fn map_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReportRow> {
    Ok(RawReportRow {
        id: row.get(0)?,
        run_id: row.get(1)?,
        bug_id: row.get(2)?,
        checker_name: row.get(3)?,
        severity: row.get(4)?,
        file_path: row.get(5)?,
        line: row.get(6)?,
        col: row.get(7)?,
        message: row.get(8)?,
        bug_path_json: row.get(9)?,
        detection_status: row.get(10)?,
        detected_at: row.get(11)?,
        fixed_at: row.get(12)?,
        review_status: row.get(13)?,
    })
}

pub(crate) fn into_report(raw: RawReportRow) -> Result<Report, StoreError> {
    let bug_path: BugPath =
        serde_json::from_str(&raw.bug_path_json).map_err(|e| StoreError::SerializationError {
            message: format!("bug path for report {}: {e}", raw.id),
        })?;
    Ok(Report {
        id: raw.id,
        run_id: RunId(raw.run_id),
        bug_id: parse_bug_id(&raw.bug_id)?,
        checker_name: raw.checker_name,
        severity: parse_severity(&raw.severity)?,
        file_path: raw.file_path,
        line: raw.line,
        column: raw.col,
        message: raw.message,
        bug_path,
        review_status: parse_review(&raw.review_status)?,
        detection_status: parse_detection(&raw.detection_status)?,
        detected_at: raw.detected_at,
        fixed_at: raw.fixed_at,
    })
}

pub(crate) fn encode_bug_path(bug_path: &BugPath) -> Result<String, StoreError> {
    serde_json::to_string(bug_path).map_err(|e| StoreError::SerializationError {
        message: format!("bug path: {e}"),
    })
}

pub(crate) fn parse_bug_id(s: &str) -> Result<BugId, StoreError> {
    BugId::from_hex(s).ok_or_else(|| StoreError::SerializationError {
        message: format!("malformed bug id '{s}'"),
    })
}

pub(crate) fn parse_severity(s: &str) -> Result<Severity, StoreError> {
    Severity::parse(s).ok_or_else(|| StoreError::SerializationError {
        message: format!("unknown severity '{s}'"),
    })
}

pub(crate) fn parse_detection(s: &str) -> Result<DetectionStatus, StoreError> {
    DetectionStatus::parse(s).ok_or_else(|| StoreError::SerializationError {
        message: format!("unknown detection status '{s}'"),
    })
}

pub(crate) fn parse_review(s: &str) -> Result<ReviewStatus, StoreError> {
    ReviewStatus::parse(s).ok_or_else(|| StoreError::SerializationError {
        message: format!("unknown review status '{s}'"),
    })
}
