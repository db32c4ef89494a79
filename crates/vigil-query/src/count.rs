//! Counting defined on top of the query path.
//!
//! Every counter folds the row sequence the same filter would return, so
//! a count always equals the length of the matching list. There is no
//! separate aggregate path.

use vigil_core::errors::QueryError;
use vigil_core::types::collections::FxHashMap;
use vigil_core::types::{DetectionStatus, ReviewStatus, Severity, SnapshotId};

use crate::engine::QueryEngine;
use crate::filter::FilterSpec;

impl QueryEngine<'_> {
    /// Number of rows `query` yields for the same snapshot and filter.
    pub fn count(&self, snapshot: SnapshotId, spec: &FilterSpec) -> Result<usize, QueryError> {
        Ok(self.query(snapshot, spec)?.count())
    }

    /// Filtered rows bucketed by severity.
    pub fn count_by_severity(
        &self,
        snapshot: SnapshotId,
        spec: &FilterSpec,
    ) -> Result<FxHashMap<Severity, usize>, QueryError> {
        let mut counts = FxHashMap::default();
        for report in self.query(snapshot, spec)? {
            *counts.entry(report.severity).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Filtered rows bucketed by detection status.
    pub fn count_by_detection_status(
        &self,
        snapshot: SnapshotId,
        spec: &FilterSpec,
    ) -> Result<FxHashMap<DetectionStatus, usize>, QueryError> {
        let mut counts = FxHashMap::default();
        for report in self.query(snapshot, spec)? {
            *counts.entry(report.detection_status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Filtered rows bucketed by review status.
    pub fn count_by_review_status(
        &self,
        snapshot: SnapshotId,
        spec: &FilterSpec,
    ) -> Result<FxHashMap<ReviewStatus, usize>, QueryError> {
        let mut counts = FxHashMap::default();
        for report in self.query(snapshot, spec)? {
            *counts.entry(report.review_status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
