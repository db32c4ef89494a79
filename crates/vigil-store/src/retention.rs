//! Retention: aging out runs that have not been updated in a long time.
//!
//! Deleting a run cascades through its reports, tags, frozen tag reports,
//! review statuses, comments, and ingest history. Source components are
//! global and never touched by retention.

use std::time::Instant;

use rusqlite::{params, Connection};
use tracing::info;
use vigil_core::errors::StoreError;

use crate::queries::sqlite_err;

const MS_PER_DAY: i64 = 86_400_000;

// ─── Policy ──────────────────────────────────────────────────────────────

/// How long run data is kept before being purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Runs whose last ingest is older than this many days are deleted,
    /// along with everything hanging off them.
    pub max_run_age_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_run_age_days: 365,
        }
    }
}

// ─── Report ──────────────────────────────────────────────────────────────

/// What one retention pass removed.
#[derive(Debug, Clone, Default)]
pub struct RetentionReport {
    pub runs_deleted: u64,
    /// Rows removed across all tables, runs included.
    pub total_deleted: u64,
    pub per_table: Vec<TableCleanup>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TableCleanup {
    pub table: &'static str,
    pub deleted: u64,
}

// ─── Application ─────────────────────────────────────────────────────────

/// Delete every run not updated since `now - max_run_age_days`.
///
/// Runs once inside a single transaction; child rows are counted before the
/// cascading delete removes them.
pub fn apply_retention(
    conn: &Connection,
    policy: &RetentionPolicy,
    now: i64,
) -> Result<RetentionReport, StoreError> {
    let started = Instant::now();
    let cutoff = now - i64::from(policy.max_run_age_days) * MS_PER_DAY;

    let tx = conn.unchecked_transaction().map_err(sqlite_err)?;
    let mut report = RetentionReport::default();

    for (table, sql) in [
        (
            "reports",
            "SELECT COUNT(*) FROM reports
             WHERE run_id IN (SELECT id FROM runs WHERE updated_at < ?1)",
        ),
        (
            "tags",
            "SELECT COUNT(*) FROM tags
             WHERE run_id IN (SELECT id FROM runs WHERE updated_at < ?1)",
        ),
        (
            "tag_reports",
            "SELECT COUNT(*) FROM tag_reports
             WHERE tag_id IN (SELECT id FROM tags
                              WHERE run_id IN (SELECT id FROM runs WHERE updated_at < ?1))",
        ),
        (
            "review_statuses",
            "SELECT COUNT(*) FROM review_statuses
             WHERE run_id IN (SELECT id FROM runs WHERE updated_at < ?1)",
        ),
        (
            "comments",
            "SELECT COUNT(*) FROM comments
             WHERE run_id IN (SELECT id FROM runs WHERE updated_at < ?1)",
        ),
        (
            "ingest_history",
            "SELECT COUNT(*) FROM ingest_history
             WHERE run_id IN (SELECT id FROM runs WHERE updated_at < ?1)",
        ),
    ] {
        let deleted = count_stale(&tx, sql, cutoff)?;
        if deleted > 0 {
            report.per_table.push(TableCleanup { table, deleted });
            report.total_deleted += deleted;
        }
    }

    let runs_deleted = tx
        .execute("DELETE FROM runs WHERE updated_at < ?1", params![cutoff])
        .map_err(sqlite_err)?;
    report.runs_deleted = runs_deleted as u64;
    report.total_deleted += runs_deleted as u64;

    tx.commit().map_err(sqlite_err)?;

    report.duration_ms = started.elapsed().as_millis() as u64;
    if report.runs_deleted > 0 {
        info!(
            runs = report.runs_deleted,
            total = report.total_deleted,
            duration_ms = report.duration_ms,
            "retention pass removed stale runs"
        );
    }

    Ok(report)
}

fn count_stale(conn: &Connection, sql: &str, cutoff: i64) -> Result<u64, StoreError> {
    conn.prepare_cached(sql)
        .map_err(sqlite_err)?
        .query_row(params![cutoff], |row| row.get::<_, i64>(0))
        .map(|n| n as u64)
        .map_err(sqlite_err)
}

// ─── Tests ───────────────────────────────────────────────────────────────
