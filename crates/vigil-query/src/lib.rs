//! Read side of the report store: filter evaluation, cross-snapshot
//! diffing, consistent counting, and keyset pagination.
//!
//! Everything goes through [`QueryEngine`], which borrows an open
//! [`vigil_store::ReportStore`]. Counts are the length of the filtered
//! row list, and diff buckets pass through the same filter machinery as
//! plain queries, so numbers shown never diverge from lists fetched.

pub mod component;
mod count;
pub mod diff;
pub mod engine;
pub mod filter;
pub mod pagination;

pub use component::ComponentMatcher;
pub use diff::DiffResult;
pub use engine::{QueryEngine, QueryResults};
pub use filter::FilterSpec;
pub use pagination::Page;
