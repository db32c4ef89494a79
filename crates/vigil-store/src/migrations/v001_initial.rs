//! V001: Initial schema — runs, reports, review statuses, ingest history.

pub const MIGRATION_SQL: &str = r#"
-- Runs: one row per named analysis session.
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

-- Reports: the current head of each run.
-- bug_id is the 128-bit identity hash as 32 lowercase hex chars; row ids are
-- snapshot-scoped and only meaningful for ordering within one head.
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    bug_id TEXT NOT NULL,
    checker_name TEXT NOT NULL,
    severity TEXT NOT NULL,
    file_path TEXT NOT NULL,
    line INTEGER NOT NULL,
    col INTEGER NOT NULL,
    message TEXT NOT NULL,
    bug_path_json TEXT NOT NULL DEFAULT '[]',
    detection_status TEXT NOT NULL,
    detected_at INTEGER NOT NULL,
    fixed_at INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_reports_run_order
    ON reports(run_id, file_path, line, id);
CREATE INDEX IF NOT EXISTS idx_reports_run_bug
    ON reports(run_id, bug_id);
CREATE INDEX IF NOT EXISTS idx_reports_active
    ON reports(run_id) WHERE detection_status IN ('new', 'unresolved', 'reopened');

-- Review statuses: triage verdicts keyed by (run, bug identity).
-- Lives outside reports so re-ingestion cannot disturb a verdict.
CREATE TABLE IF NOT EXISTS review_statuses (
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    bug_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'unreviewed',
    author TEXT NOT NULL,
    message TEXT,
    changed_at INTEGER NOT NULL,
    PRIMARY KEY (run_id, bug_id)
) STRICT;

-- Ingest history: append-only log of ingestions per run.
CREATE TABLE IF NOT EXISTS ingest_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    ingested_at INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL,
    total_reports INTEGER NOT NULL,
    new_reports INTEGER NOT NULL,
    unresolved_reports INTEGER NOT NULL,
    reopened_reports INTEGER NOT NULL,
    resolved_reports INTEGER NOT NULL,
    off_reports INTEGER NOT NULL,
    unavailable_reports INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_ingest_history_run_time
    ON ingest_history(run_id, ingested_at DESC);
"#;
