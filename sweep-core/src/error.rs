//! Error types for sweep-core.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid invocation parameters or configuration.
///
/// Every variant is fatal and is raised before any history scan, selection,
/// or formatter work begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Batch size below zero.
    #[error("number of files must be >= 0, got {0}")]
    NegativeCount(i64),

    /// An ignore pattern that does not compile as a glob or regex.
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The formatter failure pattern does not compile.
    #[error("invalid formatter failure pattern '{pattern}': {message}")]
    InvalidFailurePattern { pattern: String, message: String },

    /// The formatter failure pattern lacks the `path` / `reason` groups.
    #[error("formatter failure pattern '{pattern}' must define named groups `path` and `reason`")]
    MissingCaptureGroups { pattern: String },

    /// No formatter program configured.
    #[error("formatter command must not be empty")]
    EmptyFormatterCommand,

    /// Config file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
