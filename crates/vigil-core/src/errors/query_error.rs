//! Query, diff, and count errors.

use super::error_code::{self, VigilErrorCode};
use super::StoreError;

/// Errors that can occur during query, diff, or count evaluation.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Snapshot not found: {snapshot}")]
    SnapshotNotFound { snapshot: String },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl VigilErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SnapshotNotFound { .. } => error_code::NOT_FOUND,
            Self::InvalidFilter { .. } => error_code::INVALID_FILTER,
            Self::Store(e) => e.error_code(),
        }
    }
}
