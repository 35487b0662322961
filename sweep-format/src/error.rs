//! Error types for sweep-format.

use thiserror::Error;

use sweep_history::HistoryError;

/// The formatter could not be used at all. Always fatal for the pass.
///
/// Per-file failures are not errors; they are recorded as
/// [`sweep_core::FormatOutcome::Failed`].
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to spawn formatter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter '{program}' timed out after {timeout_secs}s and was killed")]
    TimedOut { program: String, timeout_secs: u64 },

    #[error("formatter '{program}' was terminated by a signal")]
    Terminated { program: String },

    #[error("formatter '{program}' exited with status {code}: {stderr}")]
    ExitStatus {
        program: String,
        code: i32,
        stderr: String,
    },

    /// Waiting on or reading from the child process failed.
    #[error("I/O error while running formatter '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors from a full pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("formatter error: {0}")]
    Invoke(#[from] InvokeError),
}
