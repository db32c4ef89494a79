//! V003: Source components — named signed-glob path predicates.

pub const MIGRATION_SQL: &str = r#"
-- patterns_json is an ordered JSON array of signed globs ('+src/**',
-- '-src/vendor/**', bare = include). Order matters: first match wins.
CREATE TABLE IF NOT EXISTS source_components (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    patterns_json TEXT NOT NULL,
    description TEXT,
    created_at INTEGER NOT NULL
) STRICT;
"#;
