//! Report-store errors.

use super::error_code::{self, VigilErrorCode};

/// Errors that can occur in the report store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Run not found: {run}")]
    RunNotFound { run: String },

    #[error("Tag not found: {tag}")]
    TagNotFound { tag: String },

    #[error("Component not found: {name}")]
    ComponentNotFound { name: String },

    #[error("Report {bug_id} never appeared in run {run}")]
    ReportNotFound { run: String, bug_id: String },

    #[error("Comment not found: {id}")]
    CommentNotFound { id: i64 },

    #[error("Run {run} already has a tag named {name}")]
    TagAlreadyExists { run: String, name: String },

    #[error("Component already exists: {name}")]
    ComponentAlreadyExists { name: String },

    #[error("Ingestion for run {run} still conflicted after {attempts} attempts")]
    IngestConflict { run: String, attempts: u32 },

    #[error("Migration to v{version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl VigilErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RunNotFound { .. }
            | Self::TagNotFound { .. }
            | Self::ComponentNotFound { .. }
            | Self::ReportNotFound { .. }
            | Self::CommentNotFound { .. } => error_code::NOT_FOUND,
            Self::TagAlreadyExists { .. } | Self::ComponentAlreadyExists { .. } => {
                error_code::ALREADY_EXISTS
            }
            Self::IngestConflict { .. } => error_code::CONFLICT,
            Self::MigrationFailed { .. }
            | Self::SqliteError { .. }
            | Self::SerializationError { .. } => error_code::STORE_ERROR,
        }
    }
}
