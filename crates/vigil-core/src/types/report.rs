//! Report types: the normalized draft handed over by converters, the stored
//! report, and the ingestion batch/outcome pair.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ids::{BugId, RunId};
use super::severity::Severity;
use super::status::{DetectionStatus, ReviewStatus};

/// One step of a bug path: the ordered locations an analyzer walked to reach
/// the defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugPathStep {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Bug paths are short for most checkers; keep small ones inline.
pub type BugPath = SmallVec<[BugPathStep; 4]>;

/// A defect report as supplied by the ingestion feed: already parsed and
/// normalized by an external converter, with no identity or lifecycle state
/// attached yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub checker_name: String,
    pub severity: Severity,
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    #[serde(default)]
    pub bug_path: BugPath,
}

/// A stored defect report within one snapshot (a run head or a tag).
///
/// `id` is scoped to the snapshot's backing table; it is stable for ordering
/// and pagination within that snapshot, not a global key. The global key for
/// cross-run reasoning is `bug_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub run_id: RunId,
    pub bug_id: BugId,
    pub checker_name: String,
    pub severity: Severity,
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub bug_path: BugPath,
    pub review_status: ReviewStatus,
    pub detection_status: DetectionStatus,
    /// When this identity was first (or most recently re-) detected.
    pub detected_at: i64,
    /// When this identity stopped being detected; `None` while active.
    pub fixed_at: Option<i64>,
}

/// One ingestion request: everything the analyzer feed hands over for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestBatch {
    /// Run to create or update.
    pub run_name: String,
    /// The complete report set of this analysis.
    pub reports: Vec<ReportDraft>,
    /// Checkers disabled for this analysis. A previously detected report
    /// from one of these checkers is marked `off` instead of `resolved`
    /// when it vanishes.
    #[serde(default)]
    pub disabled_checkers: Vec<String>,
    /// Files the analyzer could see, when known. A vanished report whose
    /// file is not listed here is marked `unavailable` instead of
    /// `resolved`. `None` means file availability is unknown.
    #[serde(default)]
    pub analyzed_files: Option<Vec<String>>,
}

/// Detection-status breakdown of one committed ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub run_id: RunId,
    /// Reports in the new head that are actively detected.
    pub total: usize,
    pub new: usize,
    pub unresolved: usize,
    pub reopened: usize,
    pub resolved: usize,
    pub off: usize,
    pub unavailable: usize,
}
