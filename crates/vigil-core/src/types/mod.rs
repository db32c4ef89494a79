//! Core data model shared by the store and query crates.

pub mod collections;
pub mod ids;
pub mod report;
pub mod severity;
pub mod status;

pub use ids::{BugId, RunId, SnapshotId, TagId};
pub use report::{BugPath, BugPathStep, IngestBatch, IngestOutcome, Report, ReportDraft};
pub use severity::Severity;
pub use status::{DetectionStatus, ReviewStatus};

use serde::{Deserialize, Serialize};

/// A named analysis session with a mutable current head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// An immutable named snapshot of a run's report set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub run_id: RunId,
    pub name: String,
    pub created_at: i64,
}

/// A named, ordered list of signed glob patterns used as a path predicate.
///
/// Patterns are evaluated in order; `+glob` includes, `-glob` excludes, a
/// bare pattern includes. The first matching pattern wins; a path matching
/// no pattern is excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceComponent {
    pub name: String,
    pub patterns: Vec<String>,
    pub description: Option<String>,
    pub created_at: i64,
}

/// A triage note attached to one bug identity within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub message: String,
    pub created_at: i64,
}

/// The stored review verdict for one bug identity within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub status: ReviewStatus,
    pub author: String,
    pub message: Option<String>,
    pub changed_at: i64,
}

/// One row of a run's ingest history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRecord {
    pub id: i64,
    pub run_id: RunId,
    pub ingested_at: i64,
    pub duration_ms: i64,
    pub total: usize,
    pub new: usize,
    pub unresolved: usize,
    pub reopened: usize,
    pub resolved: usize,
    pub off: usize,
    pub unavailable: usize,
}
