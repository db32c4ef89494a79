//! Report ingestion and detection-status reconciliation.
//!
//! Each ingest replaces the head of a run with the incoming report set and
//! reconciles detection statuses against the previous head:
//!
//! * identity absent before: `new`
//! * identity present and detected before: `unresolved`
//! * identity present only as `resolved`/`unavailable`: `reopened`
//! * identity vanished: `resolved`, or `off` when its checker is disabled,
//!   or `unavailable` when its file was not analyzed
//!
//! Vanished rows keep their last-seen payload so history stays inspectable;
//! matched rows are refreshed with the incoming payload. A run keeps exactly
//! as many detected rows per identity as the analyzer reported.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rusqlite::Transaction;
use tracing::info;
use vigil_core::config::VigilConfig;
use vigil_core::errors::StoreError;
use vigil_core::identity::bug_ids_parallel;
use vigil_core::types::collections::{FxHashMap, FxHashSet};
use vigil_core::types::{BugId, DetectionStatus, IngestBatch, IngestOutcome};

use crate::connection::writer::try_immediate_transaction;
use crate::connection::Database;
use crate::queries::reports::PrevRow;
use crate::queries::{ingest_history, reports, runs};

/// Per-run-name ingest locks. Two ingests into the same run would race
/// between reading the previous head and writing the new one, so they
/// serialize here before touching SQLite. Ingests into different runs only
/// contend on the write connection itself.
pub(crate) struct RunLocks {
    inner: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl RunLocks {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(FxHashMap::default()),
        }
    }

    fn acquire(&self, run_name: &str) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut map = self.inner.lock().map_err(|_| StoreError::SqliteError {
            message: "run lock registry poisoned".to_string(),
        })?;
        Ok(map
            .entry(run_name.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}

/// Ingest a batch at an explicit timestamp (milliseconds).
///
/// Identities are hashed outside the transaction, then the head is
/// reconciled inside one BEGIN IMMEDIATE transaction. A busy begin is
/// retried with backoff up to the configured retry count.
pub(crate) fn ingest_at(
    db: &Database,
    config: &VigilConfig,
    locks: &RunLocks,
    batch: IngestBatch,
    now: i64,
) -> Result<IngestOutcome, StoreError> {
    let started = Instant::now();
    let bug_ids = bug_ids_parallel(&batch.reports, &config.identity);

    let lock = locks.acquire(&batch.run_name)?;
    let _guard = lock.lock().map_err(|_| StoreError::SqliteError {
        message: format!("ingest lock for run '{}' poisoned", batch.run_name),
    })?;

    let retries = config.store.effective_busy_retries();
    for attempt in 0..=retries {
        if attempt > 0 {
            thread::sleep(Duration::from_millis(25u64 << attempt.min(5)));
        }
        let committed = db.with_writer(|conn| {
            try_immediate_transaction(conn, |tx| apply(tx, &batch, &bug_ids, now, started))
        })?;
        if let Some(outcome) = committed {
            info!(
                run = %batch.run_name,
                total = outcome.total,
                new = outcome.new,
                unresolved = outcome.unresolved,
                reopened = outcome.reopened,
                resolved = outcome.resolved,
                off = outcome.off,
                unavailable = outcome.unavailable,
                duration_ms = started.elapsed().as_millis() as i64,
                "ingested batch"
            );
            return Ok(outcome);
        }
    }

    Err(StoreError::IngestConflict {
        run: batch.run_name,
        attempts: retries + 1,
    })
}

/// Reconcile one batch against the run's head inside an open transaction.
fn apply(
    tx: &Transaction<'_>,
    batch: &IngestBatch,
    bug_ids: &[BugId],
    now: i64,
    started: Instant,
) -> Result<IngestOutcome, StoreError> {
    let run_id = runs::get_or_create(tx, &batch.run_name, now)?;

    // Previous head grouped by identity. Rows arrive ordered by
    // (file_path, line, id), so each group keeps that order.
    let mut prev: FxHashMap<BugId, Vec<PrevRow>> = FxHashMap::default();
    for row in reports::identity_snapshot(tx, run_id)? {
        prev.entry(row.bug_id).or_default().push(row);
    }

    // Incoming indices grouped by identity, each group ordered by
    // (file_path, line, column) to pair deterministically with prev rows.
    let mut incoming: FxHashMap<BugId, Vec<usize>> = FxHashMap::default();
    for (idx, id) in bug_ids.iter().enumerate() {
        incoming.entry(*id).or_default().push(idx);
    }
    for group in incoming.values_mut() {
        group.sort_by(|&a, &b| {
            let ra = &batch.reports[a];
            let rb = &batch.reports[b];
            (ra.file_path.as_str(), ra.line, ra.column)
                .cmp(&(rb.file_path.as_str(), rb.line, rb.column))
        });
    }

    let disabled: FxHashSet<&str> = batch
        .disabled_checkers
        .iter()
        .map(String::as_str)
        .collect();
    let analyzed: Option<FxHashSet<&str>> = batch
        .analyzed_files
        .as_ref()
        .map(|files| files.iter().map(String::as_str).collect());

    let mut outcome = IngestOutcome {
        run_id,
        total: batch.reports.len(),
        new: 0,
        unresolved: 0,
        reopened: 0,
        resolved: 0,
        off: 0,
        unavailable: 0,
    };

    // Identities present in this batch, in first-appearance order. Fixed
    // iteration order keeps inserted row ids, and thus report order on
    // equal (file, line), stable across identical ingests.
    let mut order: Vec<BugId> = Vec::with_capacity(incoming.len());
    let mut seen: FxHashSet<BugId> = FxHashSet::default();
    for id in bug_ids {
        if seen.insert(*id) {
            order.push(*id);
        }
    }

    for bug_id in order {
        let group = &incoming[&bug_id];
        let prev_rows = prev.remove(&bug_id).unwrap_or_default();

        let status = if prev_rows.is_empty() {
            DetectionStatus::New
        } else if prev_rows.iter().all(|r| {
            matches!(
                r.detection_status,
                DetectionStatus::Resolved | DetectionStatus::Unavailable
            )
        }) {
            DetectionStatus::Reopened
        } else {
            DetectionStatus::Unresolved
        };

        let earliest = prev_rows.iter().map(|r| r.detected_at).min();
        let paired = group.len().min(prev_rows.len());

        for i in 0..paired {
            let draft = &batch.reports[group[i]];
            let detected_at = match status {
                DetectionStatus::Unresolved => prev_rows[i].detected_at,
                _ => now,
            };
            reports::refresh(tx, prev_rows[i].id, draft, status, detected_at)?;
        }
        // Surplus rows of a still-present identity are dropped so the head
        // carries exactly the reported occurrence count.
        if prev_rows.len() > paired {
            let surplus: Vec<i64> = prev_rows[paired..].iter().map(|r| r.id).collect();
            reports::delete_many(tx, &surplus)?;
        }
        for &idx in &group[paired..] {
            let draft = &batch.reports[idx];
            let detected_at = match status {
                DetectionStatus::Unresolved => earliest.unwrap_or(now),
                _ => now,
            };
            reports::insert(tx, run_id, bug_id, draft, status, detected_at)?;
        }

        match status {
            DetectionStatus::New => outcome.new += group.len(),
            DetectionStatus::Unresolved => outcome.unresolved += group.len(),
            DetectionStatus::Reopened => outcome.reopened += group.len(),
            _ => {}
        }
    }

    // Identities that vanished from the batch.
    for rows in prev.into_values() {
        for row in rows {
            match row.detection_status {
                // Already settled; nothing changed this ingest.
                DetectionStatus::Resolved | DetectionStatus::Unavailable => {}
                DetectionStatus::Off => {
                    // Stays off while its checker is still disabled.
                    if !disabled.contains(row.checker_name.as_str()) {
                        reports::mark_absent(tx, row.id, DetectionStatus::Resolved, now)?;
                        outcome.resolved += 1;
                    }
                }
                DetectionStatus::New | DetectionStatus::Unresolved | DetectionStatus::Reopened => {
                    let status = if disabled.contains(row.checker_name.as_str()) {
                        DetectionStatus::Off
                    } else if analyzed
                        .as_ref()
                        .is_some_and(|files| !files.contains(row.file_path.as_str()))
                    {
                        DetectionStatus::Unavailable
                    } else {
                        DetectionStatus::Resolved
                    };
                    reports::mark_absent(tx, row.id, status, now)?;
                    match status {
                        DetectionStatus::Off => outcome.off += 1,
                        DetectionStatus::Unavailable => outcome.unavailable += 1,
                        _ => outcome.resolved += 1,
                    }
                }
            }
        }
    }

    runs::touch_updated_at(tx, run_id, now)?;
    let duration_ms = started.elapsed().as_millis() as i64;
    ingest_history::append(tx, run_id, now, duration_ms, &outcome)?;

    Ok(outcome)
}
