//! The identity hash itself.

use rayon::prelude::*;
use xxhash_rust::xxh3::Xxh3;

use crate::config::IdentityConfig;
use crate::types::{BugId, ReportDraft};

use super::normalize::{normalize_line, normalize_path};

/// Separator between fields of one record.
const FIELD_SEP: u8 = 0x1f;
/// Separator between bug-path steps.
const RECORD_SEP: u8 = 0x1e;

/// Compute the bug identity of a report draft.
///
/// Included in the hash: checker name, checker message, normalized file
/// path, normalized line, column (when configured), and every bug-path
/// step's normalized location plus step message. Excluded: severity, review
/// and detection statuses, timestamps, stripped path prefixes, and the
/// report's position in its batch. Two reports that agree on the included
/// fields are the same defect wherever and whenever they were found.
pub fn bug_id(draft: &ReportDraft, config: &IdentityConfig) -> BugId {
    let mut hasher = Xxh3::new();

    feed(&mut hasher, draft.checker_name.as_bytes());
    feed(&mut hasher, draft.message.as_bytes());
    feed(&mut hasher, normalize_path(&draft.file_path, config).as_bytes());
    feed_line(&mut hasher, draft.line, config);
    if config.effective_include_column() {
        feed(&mut hasher, &draft.column.to_le_bytes());
    }

    for step in &draft.bug_path {
        hasher.update(&[RECORD_SEP]);
        feed(&mut hasher, normalize_path(&step.file_path, config).as_bytes());
        feed_line(&mut hasher, step.line, config);
        feed(&mut hasher, step.message.as_bytes());
    }

    BugId(hasher.digest128())
}

fn feed(hasher: &mut Xxh3, bytes: &[u8]) {
    hasher.update(bytes);
    hasher.update(&[FIELD_SEP]);
}

fn feed_line(hasher: &mut Xxh3, line: u32, config: &IdentityConfig) {
    if let Some(normalized) = normalize_line(line, config) {
        feed(hasher, &normalized.to_le_bytes());
    }
}

/// Hash a whole batch in parallel. Output order matches input order.
pub fn bug_ids_parallel(drafts: &[ReportDraft], config: &IdentityConfig) -> Vec<BugId> {
    drafts.par_iter().map(|d| bug_id(d, config)).collect()
}
