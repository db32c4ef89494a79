//! SQLite persistence for analysis reports.
//!
//! The store keeps one head per run and reconciles every ingest against it,
//! tracking each bug identity through the `new`, `unresolved`, `resolved`,
//! `reopened`, `off`, and `unavailable` lifecycle. Around that core it
//! provides frozen tags, identity-keyed review statuses, source components,
//! triage comments, ingest history, and retention.
//!
//! Writes serialize on a single connection holding BEGIN IMMEDIATE
//! transactions; reads round-robin over a small pool of read-only
//! connections (WAL keeps them from blocking each other).

pub mod connection;
mod ingest;
pub mod migrations;
pub mod queries;
pub mod retention;
pub mod store;

pub use connection::Database;
pub use queries::components::ComponentRow;
pub use retention::{RetentionPolicy, RetentionReport, TableCleanup};
pub use store::ReportStore;
