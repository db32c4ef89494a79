//! Bug identity: a content hash that survives re-analysis.
//!
//! A bug identity is the xxh3 128-bit digest of a report's semantic content.
//! Two analysis runs that find the same defect produce the same identity even
//! when the checkout root moved or the surrounding code shifted a few lines,
//! which is what makes cross-run diffing and review-status persistence
//! possible. How much drift an identity survives is policy, not heuristic:
//! see [`crate::config::IdentityConfig`].

pub mod hash;
pub mod normalize;

pub use hash::{bug_id, bug_ids_parallel};
pub use normalize::{normalize_line, normalize_path};
