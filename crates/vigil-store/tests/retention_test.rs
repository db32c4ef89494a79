//! Integration tests for retention through the store facade.

use vigil_core::config::VigilConfig;
use vigil_core::types::{BugPath, IngestBatch, ReportDraft, Severity};
use vigil_store::{ReportStore, RetentionPolicy};

const MS_PER_DAY: i64 = 86_400_000;

fn store() -> ReportStore {
    ReportStore::open_in_memory(VigilConfig::default()).unwrap()
}

fn batch(run: &str) -> IngestBatch {
    IngestBatch {
        run_name: run.to_string(),
        reports: vec![ReportDraft {
            checker_name: "core.NullDeref".to_string(),
            severity: Severity::High,
            file_path: "src/a.c".to_string(),
            line: 10,
            column: 1,
            message: "null deref".to_string(),
            bug_path: BugPath::new(),
        }],
        disabled_checkers: Vec::new(),
        analyzed_files: None,
    }
}

#[test]
fn stale_runs_age_out_with_their_satellites() {
    let store = store();
    let now = 1_000 * MS_PER_DAY;

    store.ingest_at(batch("old-ci"), now - 400 * MS_PER_DAY).unwrap();
    store
        .create_tag_at("old-ci", "v0.9", now - 400 * MS_PER_DAY)
        .unwrap();
    store.ingest_at(batch("nightly"), now - 5 * MS_PER_DAY).unwrap();

    let report = store
        .apply_retention_at(&RetentionPolicy::default(), now)
        .unwrap();

    assert_eq!(report.runs_deleted, 1);
    assert!(report
        .per_table
        .iter()
        .any(|c| c.table == "reports" && c.deleted == 1));
    assert!(report
        .per_table
        .iter()
        .any(|c| c.table == "tags" && c.deleted == 1));
    assert!(report
        .per_table
        .iter()
        .any(|c| c.table == "ingest_history" && c.deleted == 1));

    assert!(store.run_by_name("old-ci").unwrap().is_none());
    assert!(store.run_by_name("nightly").unwrap().is_some());
}

#[test]
fn recent_ingest_shields_an_old_run() {
    let store = store();
    let now = 1_000 * MS_PER_DAY;

    // Created long ago but still actively ingested.
    store.ingest_at(batch("ci"), now - 400 * MS_PER_DAY).unwrap();
    store.ingest_at(batch("ci"), now - 2 * MS_PER_DAY).unwrap();

    let report = store
        .apply_retention_at(&RetentionPolicy::default(), now)
        .unwrap();

    assert_eq!(report.runs_deleted, 0);
    assert!(store.run_by_name("ci").unwrap().is_some());
}

#[test]
fn components_are_not_touched_by_retention() {
    let store = store();
    let now = 1_000 * MS_PER_DAY;
    store.ingest_at(batch("old-ci"), now - 400 * MS_PER_DAY).unwrap();
    store
        .add_component("frontend", &["src/ui/**".to_string()], None)
        .unwrap();

    store
        .apply_retention_at(&RetentionPolicy::default(), now)
        .unwrap();

    assert!(store.component("frontend").unwrap().is_some());
}

#[test]
fn tighter_policy_purges_sooner() {
    let store = store();
    let now = 1_000 * MS_PER_DAY;
    store.ingest_at(batch("ci"), now - 30 * MS_PER_DAY).unwrap();

    let keep_year = store
        .apply_retention_at(&RetentionPolicy::default(), now)
        .unwrap();
    assert_eq!(keep_year.runs_deleted, 0);

    let keep_week = store
        .apply_retention_at(&RetentionPolicy { max_run_age_days: 7 }, now)
        .unwrap();
    assert_eq!(keep_week.runs_deleted, 1);
}
