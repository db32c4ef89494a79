//! Property tests over randomized two-generation stores: counting stays
//! consistent with listing, uniqueing only shrinks, self-diffs behave
//! like queries, and pagination tiles the sequence.

use proptest::prelude::*;

use vigil_core::config::VigilConfig;
use vigil_core::types::{
    BugPath, DetectionStatus, IngestBatch, Report, ReportDraft, ReviewStatus, Severity,
};
use vigil_query::{FilterSpec, QueryEngine};
use vigil_store::ReportStore;

const CHECKERS: [&str; 2] = ["core.NullDeref", "unix.Malloc"];
const MESSAGES: [&str; 3] = ["buffer overflow", "null dereference", "memory leak"];
const SEVERITIES: [Severity; 4] = [
    Severity::Low,
    Severity::Medium,
    Severity::High,
    Severity::Critical,
];

type DraftSeed = (u8, u8, u32, u8, u8);

fn draft_seed() -> impl Strategy<Value = DraftSeed> {
    (0u8..4, 0u8..2, 0u32..40, 0u8..4, 0u8..3)
}

fn to_draft(seed: &DraftSeed) -> ReportDraft {
    let (file, checker, line, severity, message) = *seed;
    ReportDraft {
        checker_name: CHECKERS[checker as usize % CHECKERS.len()].to_string(),
        severity: SEVERITIES[severity as usize % SEVERITIES.len()],
        file_path: format!("src/f{}.c", file % 4),
        line: line + 1,
        column: 1,
        message: MESSAGES[message as usize % MESSAGES.len()].to_string(),
        bug_path: BugPath::new(),
    }
}

/// Two ingest generations leave the head with a mix of new, unresolved,
/// resolved, and reopened rows.
fn seeded_store(gen1: &[DraftSeed], gen2: &[DraftSeed]) -> ReportStore {
    let store = ReportStore::open_in_memory(VigilConfig::default()).unwrap();
    for (reports, now) in [(gen1, 1_000), (gen2, 2_000)] {
        store
            .ingest_at(
                IngestBatch {
                    run_name: "ci".to_string(),
                    reports: reports.iter().map(to_draft).collect(),
                    disabled_checkers: Vec::new(),
                    analyzed_files: None,
                },
                now,
            )
            .unwrap();
    }
    store
}

fn subset<T: Copy>(all: &[T], mask: u8) -> Option<Vec<T>> {
    let picked: Vec<T> = all
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, v)| *v)
        .collect();
    (!picked.is_empty()).then_some(picked)
}

fn spec_from(sev_mask: u8, det_mask: u8, rev_mask: u8, uniqueing: bool) -> FilterSpec {
    FilterSpec {
        severities: subset(&Severity::ALL, sev_mask),
        detection_statuses: subset(&DetectionStatus::ALL, det_mask),
        review_statuses: subset(&ReviewStatus::ALL, rev_mask),
        uniqueing,
        ..FilterSpec::default()
    }
}

proptest! {
    #[test]
    fn count_equals_list_length(
        gen1 in prop::collection::vec(draft_seed(), 0..10),
        gen2 in prop::collection::vec(draft_seed(), 0..10),
        sev_mask in 0u8..64,
        det_mask in 0u8..64,
        rev_mask in 0u8..16,
        uniqueing in any::<bool>(),
    ) {
        let store = seeded_store(&gen1, &gen2);
        let engine = QueryEngine::new(&store);
        let snapshot = store.head_of("ci").unwrap();
        let spec = spec_from(sev_mask, det_mask, rev_mask, uniqueing);

        let counted = engine.count(snapshot, &spec).unwrap();
        let listed = engine.query(snapshot, &spec).unwrap().count();
        prop_assert_eq!(counted, listed);
    }

    #[test]
    fn uniqueing_never_increases_the_count(
        gen1 in prop::collection::vec(draft_seed(), 0..12),
        sev_mask in 0u8..64,
    ) {
        let store = seeded_store(&gen1, &gen1);
        let engine = QueryEngine::new(&store);
        let snapshot = store.head_of("ci").unwrap();

        let plain = spec_from(sev_mask, 0, 0, false);
        let uniqued = spec_from(sev_mask, 0, 0, true);
        prop_assert!(
            engine.count(snapshot, &uniqued).unwrap()
                <= engine.count(snapshot, &plain).unwrap()
        );
    }

    #[test]
    fn self_diff_is_a_query(
        gen1 in prop::collection::vec(draft_seed(), 0..10),
        gen2 in prop::collection::vec(draft_seed(), 0..10),
        sev_mask in 0u8..64,
        det_mask in 0u8..64,
        rev_mask in 0u8..16,
        uniqueing in any::<bool>(),
    ) {
        let store = seeded_store(&gen1, &gen2);
        let engine = QueryEngine::new(&store);
        let snapshot = store.head_of("ci").unwrap();
        let spec = spec_from(sev_mask, det_mask, rev_mask, uniqueing);

        let diff = engine.diff(snapshot, snapshot, &spec).unwrap();
        prop_assert!(diff.added.is_empty());
        prop_assert!(diff.resolved.is_empty());

        let queried: Vec<Report> = engine.query(snapshot, &spec).unwrap().collect();
        prop_assert_eq!(diff.unresolved, queried);
    }

    #[test]
    fn pages_tile_the_full_sequence(
        gen1 in prop::collection::vec(draft_seed(), 0..12),
        gen2 in prop::collection::vec(draft_seed(), 0..12),
        page_size in 1usize..6,
    ) {
        let store = seeded_store(&gen1, &gen2);
        let engine = QueryEngine::new(&store);
        let snapshot = store.head_of("ci").unwrap();
        let spec = FilterSpec::default();

        let full: Vec<Report> = engine.query(snapshot, &spec).unwrap().collect();

        let mut paged: Vec<Report> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = engine
                .query_paged(snapshot, &spec, Some(page_size), cursor.as_deref())
                .unwrap();
            prop_assert!(page.reports.len() <= page_size);
            prop_assert_eq!(page.total, full.len());
            paged.extend(page.reports);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        prop_assert_eq!(paged, full);
    }

    #[test]
    fn returned_rows_satisfy_every_filter_field(
        gen1 in prop::collection::vec(draft_seed(), 0..10),
        gen2 in prop::collection::vec(draft_seed(), 0..10),
        sev_mask in 0u8..64,
        det_mask in 0u8..64,
        rev_mask in 0u8..16,
    ) {
        let store = seeded_store(&gen1, &gen2);
        let engine = QueryEngine::new(&store);
        let snapshot = store.head_of("ci").unwrap();
        let spec = spec_from(sev_mask, det_mask, rev_mask, false);

        for report in engine.query(snapshot, &spec).unwrap() {
            if let Some(severities) = &spec.severities {
                prop_assert!(severities.contains(&report.severity));
            }
            if let Some(detections) = &spec.detection_statuses {
                prop_assert!(detections.contains(&report.detection_status));
            } else {
                prop_assert!(report.detection_status.is_active());
            }
            if let Some(reviews) = &spec.review_statuses {
                prop_assert!(reviews.contains(&report.review_status));
            }
        }
    }

    #[test]
    fn default_filter_is_a_subset_of_the_widened_one(
        gen1 in prop::collection::vec(draft_seed(), 0..10),
        gen2 in prop::collection::vec(draft_seed(), 0..10),
    ) {
        let store = seeded_store(&gen1, &gen2);
        let engine = QueryEngine::new(&store);
        let snapshot = store.head_of("ci").unwrap();

        let widened = FilterSpec {
            detection_statuses: Some(DetectionStatus::ALL.to_vec()),
            review_statuses: Some(ReviewStatus::ALL.to_vec()),
            ..FilterSpec::default()
        };
        prop_assert!(
            engine.count(snapshot, &FilterSpec::default()).unwrap()
                <= engine.count(snapshot, &widened).unwrap()
        );
    }
}
