//! V002: Tags — immutable named snapshots of a run's head.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE(run_id, name)
) STRICT;

-- Tag reports: full frozen copies of head rows at capture time.
-- Copying the whole payload keeps a tag reproducible after later ingests
-- rewrite or delete the head rows it was taken from. Row ids are fresh;
-- ordering within a tag is (file_path, line, id) like any snapshot.
CREATE TABLE IF NOT EXISTS tag_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
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

CREATE INDEX IF NOT EXISTS idx_tag_reports_order
    ON tag_reports(tag_id, file_path, line, id);
CREATE INDEX IF NOT EXISTS idx_tag_reports_bug
    ON tag_reports(tag_id, bug_id);
"#;
