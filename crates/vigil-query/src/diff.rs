//! Cross-snapshot diffing by bug identity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vigil_core::errors::QueryError;
use vigil_core::types::collections::FxHashSet;
use vigil_core::types::{BugId, Report, SnapshotId};

use crate::engine::QueryEngine;
use crate::filter::FilterSpec;

/// The three buckets of a diff, each independently filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// New-side rows whose identity is active only on the new side.
    pub added: Vec<Report>,
    /// Baseline rows whose identity is active only on the baseline side.
    pub resolved: Vec<Report>,
    /// Every new-side row outside `added`.
    pub unresolved: Vec<Report>,
}

impl QueryEngine<'_> {
    /// Diffs two snapshots by bug identity.
    ///
    /// Snapshots retain settled rows (`resolved`, `off`, `unavailable`)
    /// alongside the live ones, so identity membership is decided by each
    /// side's ACTIVE rows only: `added` holds new-side rows whose identity
    /// became active, `resolved` holds baseline rows whose identity
    /// stopped being active, and `unresolved` holds every other new-side
    /// row. The filter applies to each bucket independently, so a
    /// self-diff's `unresolved` bucket equals a plain query under the
    /// same filter.
    ///
    /// Either side may be a run head or any tag of any run, including two
    /// tags of the same run.
    pub fn diff(
        &self,
        baseline: SnapshotId,
        new: SnapshotId,
        spec: &FilterSpec,
    ) -> Result<DiffResult, QueryError> {
        let filter = self.compile(spec)?;

        let baseline_rows = self.fetch_snapshot(baseline)?;
        // One fetch when both sides name the same snapshot; a self-diff
        // must see a single state even while ingests land.
        let new_rows = if new == baseline {
            baseline_rows.clone()
        } else {
            self.fetch_snapshot(new)?
        };

        let baseline_active = active_identities(&baseline_rows);
        let new_active = active_identities(&new_rows);

        let mut added = Vec::new();
        let mut unresolved = Vec::new();
        for report in new_rows {
            if new_active.contains(&report.bug_id) && !baseline_active.contains(&report.bug_id) {
                added.push(report);
            } else {
                unresolved.push(report);
            }
        }
        let resolved: Vec<Report> = baseline_rows
            .into_iter()
            .filter(|r| baseline_active.contains(&r.bug_id) && !new_active.contains(&r.bug_id))
            .collect();

        let result = DiffResult {
            added: filter.apply(added),
            resolved: filter.apply(resolved),
            unresolved: filter.apply(unresolved),
        };
        debug!(
            baseline = %baseline,
            new = %new,
            added = result.added.len(),
            resolved = result.resolved.len(),
            unresolved = result.unresolved.len(),
            "diff evaluated"
        );
        Ok(result)
    }
}

fn active_identities(rows: &[Report]) -> FxHashSet<BugId> {
    rows.iter()
        .filter(|r| r.detection_status.is_active())
        .map(|r| r.bug_id)
        .collect()
}
