//! Error types for sweep-history.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading revision history.
///
/// The scanner downgrades most of these to a degraded ordering; only a
/// failure to enumerate files at all reaches the caller.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// `git` could not be spawned.
    #[error("failed to spawn git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    /// `git` ran but exited unsuccessfully.
    #[error("git {args} failed: {stderr}")]
    Git { args: String, stderr: String },

    /// Unexpected line in `git log` output.
    #[error("unexpected git log line: '{line}'")]
    Parse { line: String },

    /// Working-tree walk failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Convenience constructor for [`HistoryError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> HistoryError {
    HistoryError::Io {
        path: path.into(),
        source,
    }
}
