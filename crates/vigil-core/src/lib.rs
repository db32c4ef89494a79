//! vigil-core: domain model for the Vigil defect store.
//!
//! This crate is the pure layer underneath the store and query engines:
//! - Types: runs, tags, reports, severities, triage statuses
//! - Identity: the content hash that names "the same defect" across runs
//! - Config: layered `vigil.toml` + `VIGIL_*` environment resolution
//! - Errors: one `thiserror` enum per subsystem, zero `anyhow`
//!
//! No I/O and no SQLite here; persistence lives in `vigil-store`, reads in
//! `vigil-query`.

pub mod config;
pub mod errors;
pub mod identity;
pub mod types;

pub use config::{IdentityConfig, VigilConfig};
pub use errors::{ConfigError, QueryError, StoreError};
pub use identity::{bug_id, bug_ids_parallel};
pub use types::ids::{BugId, RunId, SnapshotId, TagId};
pub use types::report::{BugPath, BugPathStep, IngestBatch, IngestOutcome, Report, ReportDraft};
pub use types::severity::Severity;
pub use types::status::{DetectionStatus, ReviewStatus};
pub use types::{Comment, IngestRecord, ReviewRecord, Run, SourceComponent, Tag};
