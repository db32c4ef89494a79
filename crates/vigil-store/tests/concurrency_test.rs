//! Integration tests for connection handling under concurrency: pragma
//! setup, write serialization, snapshot isolation for readers, and the
//! read-only pool.

use std::sync::{Arc, Barrier};
use std::thread;

use vigil_core::config::VigilConfig;
use vigil_core::errors::StoreError;
use vigil_core::types::{BugPath, DetectionStatus, IngestBatch, ReportDraft, Severity};
use vigil_store::{Database, ReportStore};

fn batch(run: &str, count: usize) -> IngestBatch {
    let reports = (0..count)
        .map(|i| ReportDraft {
            checker_name: "core.NullDeref".to_string(),
            severity: Severity::High,
            file_path: format!("src/file_{i}.c"),
            line: 10,
            column: 1,
            message: format!("null deref {i}"),
            bug_path: BugPath::new(),
        })
        .collect();
    IngestBatch {
        run_name: run.to_string(),
        reports,
        disabled_checkers: Vec::new(),
        analyzed_files: None,
    }
}

#[test]
fn pragmas_are_applied_to_the_writer() {
    let dir = tempfile::tempdir().unwrap();
    let config = VigilConfig::default();
    let db = Database::open(&dir.path().join("vigil.db"), &config.store).unwrap();

    let (journal, foreign_keys, synchronous) = db
        .with_writer(|conn| {
            let journal: String = conn
                .query_row("PRAGMA journal_mode", [], |r| r.get(0))
                .map_err(|e| StoreError::SqliteError {
                    message: e.to_string(),
                })?;
            let foreign_keys: i64 = conn
                .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
                .map_err(|e| StoreError::SqliteError {
                    message: e.to_string(),
                })?;
            let synchronous: i64 = conn
                .query_row("PRAGMA synchronous", [], |r| r.get(0))
                .map_err(|e| StoreError::SqliteError {
                    message: e.to_string(),
                })?;
            Ok((journal, foreign_keys, synchronous))
        })
        .unwrap();

    assert_eq!(journal, "wal");
    assert_eq!(foreign_keys, 1);
    assert_eq!(synchronous, 1); // NORMAL
}

#[test]
fn reopening_preserves_data_and_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");
    let config = VigilConfig::default();

    {
        let store = ReportStore::open(&path, config.clone()).unwrap();
        store.ingest_at(batch("ci", 3), 1_000).unwrap();
    }

    let store = ReportStore::open(&path, config).unwrap();
    let head = store.get_snapshot(store.head_of("ci").unwrap()).unwrap();
    assert_eq!(head.len(), 3);
    assert!(head
        .iter()
        .all(|r| r.detection_status == DetectionStatus::New));
}

#[test]
fn concurrent_ingests_into_distinct_runs() {
    let store = Arc::new(ReportStore::open_in_memory(VigilConfig::default()).unwrap());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store
                    .ingest_at(batch(&format!("run-{i}"), 20), 1_000 + i)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let out = handle.join().unwrap();
        assert_eq!(out.new, 20);
    }
    assert_eq!(store.list_runs().unwrap().len(), 4);
}

#[test]
fn concurrent_ingests_into_the_same_run_serialize() {
    let store = Arc::new(ReportStore::open_in_memory(VigilConfig::default()).unwrap());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.ingest_at(batch("shared", 10), 1_000 + i).unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every generation committed, in some serial order.
    assert_eq!(store.ingest_history("shared").unwrap().len(), 4);
    let head = store.get_snapshot(store.head_of("shared").unwrap()).unwrap();
    assert_eq!(head.len(), 10);
}

#[test]
fn readers_see_whole_generations_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        ReportStore::open(&dir.path().join("vigil.db"), VigilConfig::default()).unwrap(),
    );
    store.ingest_at(batch("ci", 50), 1_000).unwrap();
    let snapshot = store.head_of("ci").unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for generation in 0..20 {
                store.ingest_at(batch("ci", 50), 2_000 + generation).unwrap();
            }
        })
    };

    // WAL snapshot isolation: a reader never observes a half-applied
    // generation of the same 50-report batch.
    for _ in 0..100 {
        let head = store.get_snapshot(snapshot).unwrap();
        assert_eq!(head.len(), 50);
        assert!(head
            .iter()
            .all(|r| r.detection_status == DetectionStatus::New
                || r.detection_status == DetectionStatus::Unresolved));
    }

    writer.join().unwrap();
}

#[test]
fn read_pool_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config = VigilConfig::default();
    let db = Database::open(&dir.path().join("vigil.db"), &config.store).unwrap();

    let result = db.with_reader(|conn| {
        conn.execute(
            "INSERT INTO runs (name, created_at, updated_at) VALUES ('x', 1, 1)",
            [],
        )
        .map_err(|e| StoreError::SqliteError {
            message: e.to_string(),
        })?;
        Ok(())
    });

    assert!(result.is_err());
}
