//! Filters: the caller-facing shape and its compiled, matchable form.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use vigil_core::errors::QueryError;
use vigil_core::types::collections::{FxHashMap, FxHashSet};
use vigil_core::types::{BugId, DetectionStatus, Report, ReviewStatus, Severity};

use crate::component::ComponentMatcher;

/// Review statuses matched when a filter leaves `review_statuses` unset.
pub const DEFAULT_REVIEW_STATUSES: [ReviewStatus; 2] =
    [ReviewStatus::Unreviewed, ReviewStatus::Confirmed];

/// Detection statuses matched when a filter leaves `detection_statuses`
/// unset.
pub const DEFAULT_DETECTION_STATUSES: [DetectionStatus; 3] = [
    DetectionStatus::New,
    DetectionStatus::Reopened,
    DetectionStatus::Unresolved,
];

/// Caller-facing filter over the rows of one snapshot.
///
/// Values within one field OR together; fields AND together. `None` leaves
/// a field unconstrained, except that review statuses default to
/// `{unreviewed, confirmed}` and detection statuses to
/// `{new, reopened, unresolved}`. A `Some` holding an empty list is
/// rejected as `InvalidFilter` rather than silently matching nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub severities: Option<Vec<Severity>>,
    pub review_statuses: Option<Vec<ReviewStatus>>,
    pub detection_statuses: Option<Vec<DetectionStatus>>,
    /// Glob patterns over checker names.
    pub checker_names: Option<Vec<String>>,
    /// Glob patterns over file paths.
    pub file_paths: Option<Vec<String>>,
    /// Case-insensitive substring of the report message.
    pub message_contains: Option<String>,
    /// Name of a stored source component used as a path predicate.
    pub component: Option<String>,
    /// Pass one representative per bug identity instead of every stored
    /// instance.
    pub uniqueing: bool,
}

/// A `FilterSpec` compiled for row evaluation: status sets hashed, globs
/// built, the named component resolved to its matcher. Compiled once per
/// engine call.
pub(crate) struct CompiledFilter {
    severities: Option<FxHashSet<Severity>>,
    review_statuses: FxHashSet<ReviewStatus>,
    detection_statuses: FxHashSet<DetectionStatus>,
    checkers: Option<GlobSet>,
    files: Option<GlobSet>,
    message_needle: Option<String>,
    component: Option<Arc<ComponentMatcher>>,
    uniqueing: bool,
}

impl CompiledFilter {
    pub(crate) fn new(
        spec: &FilterSpec,
        component: Option<Arc<ComponentMatcher>>,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            severities: optional_set(&spec.severities, "severities")?,
            review_statuses: set_or_default(
                &spec.review_statuses,
                "review_statuses",
                &DEFAULT_REVIEW_STATUSES,
            )?,
            detection_statuses: set_or_default(
                &spec.detection_statuses,
                "detection_statuses",
                &DEFAULT_DETECTION_STATUSES,
            )?,
            checkers: build_globs(&spec.checker_names, "checker_names")?,
            files: build_globs(&spec.file_paths, "file_paths")?,
            message_needle: spec.message_contains.as_ref().map(|s| s.to_lowercase()),
            component,
            uniqueing: spec.uniqueing,
        })
    }

    pub(crate) fn matches(&self, report: &Report) -> bool {
        if let Some(severities) = &self.severities {
            if !severities.contains(&report.severity) {
                return false;
            }
        }
        if !self.review_statuses.contains(&report.review_status) {
            return false;
        }
        if !self.detection_statuses.contains(&report.detection_status) {
            return false;
        }
        if let Some(checkers) = &self.checkers {
            if !checkers.is_match(&report.checker_name) {
                return false;
            }
        }
        if let Some(files) = &self.files {
            if !files.is_match(&report.file_path) {
                return false;
            }
        }
        if let Some(needle) = &self.message_needle {
            if !report.message.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(component) = &self.component {
            if !component.matches(&report.file_path) {
                return false;
            }
        }
        true
    }

    /// Filters a snapshot row sequence, preserving its (file, line, id)
    /// order, then collapses identities when uniqueing is on.
    pub(crate) fn apply(&self, reports: Vec<Report>) -> Vec<Report> {
        let kept: Vec<Report> = reports.into_iter().filter(|r| self.matches(r)).collect();
        if self.uniqueing {
            unique_by_identity(kept)
        } else {
            kept
        }
    }
}

/// One representative per identity: highest severity wins, ties broken by
/// lowest row id. The survivors are re-sorted into snapshot order.
fn unique_by_identity(reports: Vec<Report>) -> Vec<Report> {
    let mut best: FxHashMap<BugId, Report> = FxHashMap::default();
    for report in reports {
        match best.entry(report.bug_id) {
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if report.severity > current.severity
                    || (report.severity == current.severity && report.id < current.id)
                {
                    slot.insert(report);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(report);
            }
        }
    }
    let mut kept: Vec<Report> = best.into_values().collect();
    kept.sort_by(|a, b| {
        a.file_path
            .cmp(&b.file_path)
            .then(a.line.cmp(&b.line))
            .then(a.id.cmp(&b.id))
    });
    kept
}

fn optional_set<T>(field: &Option<Vec<T>>, name: &str) -> Result<Option<FxHashSet<T>>, QueryError>
where
    T: Copy + Eq + std::hash::Hash,
{
    match field {
        None => Ok(None),
        Some(values) if values.is_empty() => Err(empty_set(name)),
        Some(values) => Ok(Some(values.iter().copied().collect())),
    }
}

fn set_or_default<T>(
    field: &Option<Vec<T>>,
    name: &str,
    default: &[T],
) -> Result<FxHashSet<T>, QueryError>
where
    T: Copy + Eq + std::hash::Hash,
{
    match field {
        None => Ok(default.iter().copied().collect()),
        Some(values) if values.is_empty() => Err(empty_set(name)),
        Some(values) => Ok(values.iter().copied().collect()),
    }
}

fn build_globs(patterns: &Option<Vec<String>>, name: &str) -> Result<Option<GlobSet>, QueryError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Err(empty_set(name));
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| QueryError::InvalidFilter {
            message: format!("{name}: bad glob {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| QueryError::InvalidFilter {
        message: format!("{name}: {e}"),
    })?;
    Ok(Some(set))
}

fn empty_set(name: &str) -> QueryError {
    QueryError::InvalidFilter {
        message: format!("{name} must not be empty when given"),
    }
}
