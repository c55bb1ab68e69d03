//! Sync check error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent a sync check from reaching a verdict.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The path is not a git repository, or it could not be opened.
    #[error("cannot open repository at {path}: {source}")]
    Open {
        /// Repository path.
        path: PathBuf,
        /// Underlying git error.
        #[source]
        source: git2::Error,
    },

    /// A git query failed.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// The blocking inspection task did not complete.
    #[error("inspection task failed: {0}")]
    Task(String),
}

/// Result type for sync checks.
pub type Result<T> = std::result::Result<T, SyncError>;
