//! Integration tests for ingest reconciliation: the detection-status
//! lifecycle across generations of the same run.

use vigil_core::config::VigilConfig;
use vigil_core::types::{
    BugPath, DetectionStatus, IngestBatch, Report, ReportDraft, Severity,
};
use vigil_store::ReportStore;

fn store() -> ReportStore {
    ReportStore::open_in_memory(VigilConfig::default()).unwrap()
}

fn draft(checker: &str, file: &str, line: u32, message: &str) -> ReportDraft {
    ReportDraft {
        checker_name: checker.to_string(),
        severity: Severity::High,
        file_path: file.to_string(),
        line,
        column: 1,
        message: message.to_string(),
        bug_path: BugPath::new(),
    }
}

fn batch(run: &str, reports: Vec<ReportDraft>) -> IngestBatch {
    IngestBatch {
        run_name: run.to_string(),
        reports,
        disabled_checkers: Vec::new(),
        analyzed_files: None,
    }
}

fn head(store: &ReportStore, run: &str) -> Vec<Report> {
    store.get_snapshot(store.head_of(run).unwrap()).unwrap()
}

fn by_message<'a>(reports: &'a [Report], message: &str) -> &'a Report {
    reports
        .iter()
        .find(|r| r.message == message)
        .unwrap_or_else(|| panic!("no report with message '{message}'"))
}

#[test]
fn first_ingest_marks_everything_new() {
    let store = store();
    let out = store
        .ingest_at(
            batch(
                "ci",
                vec![
                    draft("core.NullDeref", "src/a.c", 10, "null deref"),
                    draft("core.DivZero", "src/b.c", 20, "division by zero"),
                ],
            ),
            1_000,
        )
        .unwrap();

    assert_eq!(out.total, 2);
    assert_eq!(out.new, 2);
    assert_eq!(out.unresolved, 0);
    assert_eq!(out.reopened, 0);
    assert_eq!(out.resolved, 0);

    let head = head(&store, "ci");
    assert_eq!(head.len(), 2);
    assert!(head
        .iter()
        .all(|r| r.detection_status == DetectionStatus::New));
    assert!(head.iter().all(|r| r.detected_at == 1_000));
    assert!(head.iter().all(|r| r.fixed_at.is_none()));
    // Snapshot order is (file_path, line, id).
    assert_eq!(head[0].file_path, "src/a.c");
    assert_eq!(head[1].file_path, "src/b.c");
}

#[test]
fn matched_identity_becomes_unresolved_and_refreshes_payload() {
    let store = store();
    store
        .ingest_at(
            batch("ci", vec![draft("core.NullDeref", "src/a.c", 12, "null deref")]),
            1_000,
        )
        .unwrap();

    // Same identity: the line moved within its bucket, and severity is not
    // part of the hash.
    let mut moved = draft("core.NullDeref", "src/a.c", 14, "null deref");
    moved.severity = Severity::Medium;
    let out = store.ingest_at(batch("ci", vec![moved]), 2_000).unwrap();

    assert_eq!(out.unresolved, 1);
    assert_eq!(out.new, 0);

    let head = head(&store, "ci");
    assert_eq!(head.len(), 1);
    let r = &head[0];
    assert_eq!(r.detection_status, DetectionStatus::Unresolved);
    assert_eq!(r.line, 14);
    assert_eq!(r.severity, Severity::Medium);
    // First-seen time survives the refresh.
    assert_eq!(r.detected_at, 1_000);
    assert!(r.fixed_at.is_none());
}

#[test]
fn vanished_identity_resolves_in_place() {
    let store = store();
    store
        .ingest_at(
            batch(
                "ci",
                vec![
                    draft("core.NullDeref", "src/a.c", 10, "null deref"),
                    draft("core.DivZero", "src/b.c", 20, "division by zero"),
                ],
            ),
            1_000,
        )
        .unwrap();

    let out = store
        .ingest_at(
            batch("ci", vec![draft("core.NullDeref", "src/a.c", 10, "null deref")]),
            2_000,
        )
        .unwrap();

    assert_eq!(out.total, 1);
    assert_eq!(out.unresolved, 1);
    assert_eq!(out.resolved, 1);

    // The resolved row stays in the head with its last-seen payload.
    let head = head(&store, "ci");
    assert_eq!(head.len(), 2);
    let gone = by_message(&head, "division by zero");
    assert_eq!(gone.detection_status, DetectionStatus::Resolved);
    assert_eq!(gone.checker_name, "core.DivZero");
    assert_eq!(gone.detected_at, 1_000);
    assert_eq!(gone.fixed_at, Some(2_000));
}

#[test]
fn resolved_identity_reappears_as_reopened() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    store.ingest_at(batch("ci", vec![a()]), 2_000).unwrap();
    let out = store.ingest_at(batch("ci", vec![a(), b()]), 3_000).unwrap();

    assert_eq!(out.unresolved, 1);
    assert_eq!(out.reopened, 1);

    let head = head(&store, "ci");
    let reopened = by_message(&head, "division by zero");
    assert_eq!(reopened.detection_status, DetectionStatus::Reopened);
    // Reopening stamps a fresh detection time and clears fixed_at.
    assert_eq!(reopened.detected_at, 3_000);
    assert!(reopened.fixed_at.is_none());
}

#[test]
fn fixed_at_is_stamped_once() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    store.ingest_at(batch("ci", vec![a()]), 2_000).unwrap();
    let out = store.ingest_at(batch("ci", vec![a()]), 3_000).unwrap();

    // Already resolved; nothing transitioned this generation.
    assert_eq!(out.resolved, 0);
    let head = head(&store, "ci");
    let gone = by_message(&head, "division by zero");
    assert_eq!(gone.fixed_at, Some(2_000));
}

#[test]
fn vanished_report_of_disabled_checker_goes_off() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("alpha.Experimental", "src/b.c", 20, "maybe leak");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();

    let mut gen2 = batch("ci", vec![a()]);
    gen2.disabled_checkers = vec!["alpha.Experimental".to_string()];
    let out = store.ingest_at(gen2, 2_000).unwrap();

    assert_eq!(out.off, 1);
    assert_eq!(out.resolved, 0);
    let head = head(&store, "ci");
    let off = by_message(&head, "maybe leak");
    assert_eq!(off.detection_status, DetectionStatus::Off);
    assert_eq!(off.fixed_at, Some(2_000));
}

#[test]
fn off_stays_off_while_checker_disabled() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("alpha.Experimental", "src/b.c", 20, "maybe leak");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let mut gen2 = batch("ci", vec![a()]);
    gen2.disabled_checkers = vec!["alpha.Experimental".to_string()];
    store.ingest_at(gen2, 2_000).unwrap();

    let mut gen3 = batch("ci", vec![a()]);
    gen3.disabled_checkers = vec!["alpha.Experimental".to_string()];
    let out = store.ingest_at(gen3, 3_000).unwrap();

    assert_eq!(out.off, 0);
    assert_eq!(out.resolved, 0);
    let head = head(&store, "ci");
    assert_eq!(
        by_message(&head, "maybe leak").detection_status,
        DetectionStatus::Off
    );
}

#[test]
fn off_resolves_when_checker_reenabled_and_still_absent() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("alpha.Experimental", "src/b.c", 20, "maybe leak");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let mut gen2 = batch("ci", vec![a()]);
    gen2.disabled_checkers = vec!["alpha.Experimental".to_string()];
    store.ingest_at(gen2, 2_000).unwrap();

    // Checker enabled again, report still gone: it was actually fixed.
    let out = store.ingest_at(batch("ci", vec![a()]), 3_000).unwrap();

    assert_eq!(out.resolved, 1);
    let head = head(&store, "ci");
    let fixed = by_message(&head, "maybe leak");
    assert_eq!(fixed.detection_status, DetectionStatus::Resolved);
    // The off transition already stamped fixed_at; it is not restamped.
    assert_eq!(fixed.fixed_at, Some(2_000));
}

#[test]
fn off_identity_reappearing_becomes_unresolved() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("alpha.Experimental", "src/b.c", 20, "maybe leak");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let mut gen2 = batch("ci", vec![a()]);
    gen2.disabled_checkers = vec!["alpha.Experimental".to_string()];
    store.ingest_at(gen2, 2_000).unwrap();

    let out = store.ingest_at(batch("ci", vec![a(), b()]), 3_000).unwrap();

    assert_eq!(out.unresolved, 2);
    assert_eq!(out.reopened, 0);
    let head = head(&store, "ci");
    let back = by_message(&head, "maybe leak");
    assert_eq!(back.detection_status, DetectionStatus::Unresolved);
    assert!(back.fixed_at.is_none());
}

#[test]
fn vanished_report_in_unanalyzed_file_goes_unavailable() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();

    // Partial analysis: only src/a.c was in scope this time.
    let mut gen2 = batch("ci", vec![a()]);
    gen2.analyzed_files = Some(vec!["src/a.c".to_string()]);
    let out = store.ingest_at(gen2, 2_000).unwrap();

    assert_eq!(out.unavailable, 1);
    assert_eq!(out.resolved, 0);
    let head = head(&store, "ci");
    let missing = by_message(&head, "division by zero");
    assert_eq!(missing.detection_status, DetectionStatus::Unavailable);
}

#[test]
fn unavailable_identity_reappears_as_reopened() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let mut gen2 = batch("ci", vec![a()]);
    gen2.analyzed_files = Some(vec!["src/a.c".to_string()]);
    store.ingest_at(gen2, 2_000).unwrap();

    let out = store.ingest_at(batch("ci", vec![a(), b()]), 3_000).unwrap();

    assert_eq!(out.reopened, 1);
    let head = head(&store, "ci");
    assert_eq!(
        by_message(&head, "division by zero").detection_status,
        DetectionStatus::Reopened
    );
}

#[test]
fn vanished_identity_in_fully_analyzed_scope_resolves() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let mut gen2 = batch("ci", vec![a()]);
    gen2.analyzed_files = Some(vec!["src/a.c".to_string(), "src/b.c".to_string()]);
    let out = store.ingest_at(gen2, 2_000).unwrap();

    assert_eq!(out.resolved, 1);
    assert_eq!(out.unavailable, 0);
}

#[test]
fn duplicate_identities_shrink_to_reported_count() {
    let store = store();
    // Lines 11 and 13 fall in the same bucket, so both occurrences carry the
    // same identity while staying distinguishable by line.
    let gen1 = vec![
        draft("core.NullDeref", "src/a.c", 11, "null deref"),
        draft("core.NullDeref", "src/a.c", 13, "null deref"),
    ];
    let out = store.ingest_at(batch("ci", gen1), 1_000).unwrap();
    assert_eq!(out.new, 2);
    assert_eq!(head(&store, "ci").len(), 2);

    let gen2 = vec![draft("core.NullDeref", "src/a.c", 12, "null deref")];
    let out = store.ingest_at(batch("ci", gen2), 2_000).unwrap();

    assert_eq!(out.unresolved, 1);
    assert_eq!(out.resolved, 0);
    let head = head(&store, "ci");
    assert_eq!(head.len(), 1);
    assert_eq!(head[0].line, 12);
    assert_eq!(head[0].detected_at, 1_000);
}

#[test]
fn duplicate_identities_grow_with_inherited_first_seen() {
    let store = store();
    let gen1 = vec![draft("core.NullDeref", "src/a.c", 11, "null deref")];
    store.ingest_at(batch("ci", gen1), 1_000).unwrap();

    let gen2 = vec![
        draft("core.NullDeref", "src/a.c", 11, "null deref"),
        draft("core.NullDeref", "src/a.c", 13, "null deref"),
    ];
    let out = store.ingest_at(batch("ci", gen2), 2_000).unwrap();

    assert_eq!(out.unresolved, 2);
    assert_eq!(out.new, 0);
    let head = head(&store, "ci");
    assert_eq!(head.len(), 2);
    // The extra occurrence inherits the group's earliest detection time.
    assert!(head.iter().all(|r| r.detected_at == 1_000));
    assert!(head
        .iter()
        .all(|r| r.detection_status == DetectionStatus::Unresolved));
}

#[test]
fn outcome_counters_match_head_statuses() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");
    let c = || draft("core.UseAfterFree", "src/c.c", 30, "use after free");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let out = store.ingest_at(batch("ci", vec![a(), c()]), 2_000).unwrap();

    assert_eq!(out.total, 2);
    assert_eq!(out.new, 1);
    assert_eq!(out.unresolved, 1);
    assert_eq!(out.resolved, 1);

    let head = head(&store, "ci");
    let count = |status: DetectionStatus| {
        head.iter()
            .filter(|r| r.detection_status == status)
            .count()
    };
    assert_eq!(count(DetectionStatus::New), out.new);
    assert_eq!(count(DetectionStatus::Unresolved), out.unresolved);
    assert_eq!(count(DetectionStatus::Resolved), 1);
}

#[test]
fn ingest_history_records_every_generation() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    store.ingest_at(batch("ci", vec![a()]), 2_000).unwrap();

    let history = store.ingest_history("ci").unwrap();
    assert_eq!(history.len(), 2);
    // Newest first.
    assert_eq!(history[0].ingested_at, 2_000);
    assert_eq!(history[0].total, 1);
    assert_eq!(history[0].unresolved, 1);
    assert_eq!(history[0].resolved, 1);
    assert_eq!(history[1].ingested_at, 1_000);
    assert_eq!(history[1].new, 2);
}

#[test]
fn run_metadata_tracks_ingests() {
    let store = store();
    store
        .ingest_at(
            batch("nightly", vec![draft("core.NullDeref", "src/a.c", 10, "null deref")]),
            1_000,
        )
        .unwrap();
    store
        .ingest_at(
            batch("nightly", vec![draft("core.NullDeref", "src/a.c", 10, "null deref")]),
            5_000,
        )
        .unwrap();

    let run = store.run_by_name("nightly").unwrap().unwrap();
    assert_eq!(run.created_at, 1_000);
    assert_eq!(run.updated_at, 5_000);

    let runs = store.list_runs().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].name, "nightly");
}

#[test]
fn empty_batch_resolves_the_whole_head() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("core.DivZero", "src/b.c", 20, "division by zero");

    store.ingest_at(batch("ci", vec![a(), b()]), 1_000).unwrap();
    let out = store.ingest_at(batch("ci", vec![]), 2_000).unwrap();

    assert_eq!(out.total, 0);
    assert_eq!(out.resolved, 2);
    let head = head(&store, "ci");
    assert_eq!(head.len(), 2);
    assert!(head
        .iter()
        .all(|r| r.detection_status == DetectionStatus::Resolved));
}

#[test]
fn four_generation_walk() {
    let store = store();
    let a = || draft("core.NullDeref", "src/a.c", 10, "null deref");
    let b = || draft("alpha.Experimental", "src/b.c", 20, "maybe leak");
    let c = || draft("core.UseAfterFree", "src/c.c", 30, "use after free");

    // Gen 1: everything new.
    let out = store
        .ingest_at(batch("ci", vec![a(), b(), c()]), 1_000)
        .unwrap();
    assert_eq!((out.new, out.unresolved, out.reopened), (3, 0, 0));

    // Gen 2: c is fixed.
    let out = store.ingest_at(batch("ci", vec![a(), b()]), 2_000).unwrap();
    assert_eq!((out.unresolved, out.resolved), (2, 1));

    // Gen 3: c comes back.
    let out = store
        .ingest_at(batch("ci", vec![a(), b(), c()]), 3_000)
        .unwrap();
    assert_eq!((out.unresolved, out.reopened), (2, 1));

    // Gen 4: b's checker is disabled, c is fixed again.
    let mut gen4 = batch("ci", vec![a()]);
    gen4.disabled_checkers = vec!["alpha.Experimental".to_string()];
    let out = store.ingest_at(gen4, 4_000).unwrap();
    assert_eq!((out.unresolved, out.off, out.resolved), (1, 1, 1));

    let head = head(&store, "ci");
    assert_eq!(head.len(), 3);
    assert_eq!(
        by_message(&head, "null deref").detection_status,
        DetectionStatus::Unresolved
    );
    assert_eq!(by_message(&head, "null deref").detected_at, 1_000);
    assert_eq!(
        by_message(&head, "maybe leak").detection_status,
        DetectionStatus::Off
    );
    let c_row = by_message(&head, "use after free");
    assert_eq!(c_row.detection_status, DetectionStatus::Resolved);
    // Reopening cleared the first fixed_at, so this one is gen 4's.
    assert_eq!(c_row.fixed_at, Some(4_000));
    assert_eq!(c_row.detected_at, 3_000);
}
