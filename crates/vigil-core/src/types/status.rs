//! Triage statuses: the human review decision and the computed detection
//! lifecycle state.

use serde::{Deserialize, Serialize};

/// Human triage classification of a bug identity. Owned by the latest human
/// decision; persists across re-ingestion of the same identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Unreviewed,
    Confirmed,
    FalsePositive,
    Intentional,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 4] = [
        ReviewStatus::Unreviewed,
        ReviewStatus::Confirmed,
        ReviewStatus::FalsePositive,
        ReviewStatus::Intentional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Unreviewed => "unreviewed",
            ReviewStatus::Confirmed => "confirmed",
            ReviewStatus::FalsePositive => "false_positive",
            ReviewStatus::Intentional => "intentional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unreviewed" => Some(ReviewStatus::Unreviewed),
            "confirmed" => Some(ReviewStatus::Confirmed),
            "false_positive" => Some(ReviewStatus::FalsePositive),
            "intentional" => Some(ReviewStatus::Intentional),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a report relative to the prior snapshot of its run,
/// recomputed on every ingestion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    /// First seen in the latest ingestion.
    New,
    /// Present in both the previous head and the latest ingestion.
    Unresolved,
    /// Present in the previous head, absent from the latest ingestion.
    Resolved,
    /// Previously resolved or unavailable, detected again.
    Reopened,
    /// Absent because its checker was disabled for the latest analysis.
    Off,
    /// Absent because its source file was not among the analyzed files.
    Unavailable,
}

impl DetectionStatus {
    pub const ALL: [DetectionStatus; 6] = [
        DetectionStatus::New,
        DetectionStatus::Unresolved,
        DetectionStatus::Resolved,
        DetectionStatus::Reopened,
        DetectionStatus::Off,
        DetectionStatus::Unavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DetectionStatus::New => "new",
            DetectionStatus::Unresolved => "unresolved",
            DetectionStatus::Resolved => "resolved",
            DetectionStatus::Reopened => "reopened",
            DetectionStatus::Off => "off",
            DetectionStatus::Unavailable => "unavailable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(DetectionStatus::New),
            "unresolved" => Some(DetectionStatus::Unresolved),
            "resolved" => Some(DetectionStatus::Resolved),
            "reopened" => Some(DetectionStatus::Reopened),
            "off" => Some(DetectionStatus::Off),
            "unavailable" => Some(DetectionStatus::Unavailable),
            _ => None,
        }
    }

    /// Whether the defect was being actively detected in the head this
    /// status was computed for.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            DetectionStatus::New | DetectionStatus::Unresolved | DetectionStatus::Reopened
        )
    }
}

impl std::fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
