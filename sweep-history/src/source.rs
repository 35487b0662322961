//! The revision-history provider interface.

use chrono::{DateTime, Utc};

use crate::error::HistoryError;

/// One commit and the paths it modified.
///
/// `modified` excludes paths the commit only added: a file that has never
/// changed since it was added keeps the earliest recency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitTouch {
    pub id: String,
    pub committed_at: Option<DateTime<Utc>>,
    pub modified: Vec<String>,
}

/// Anything that can answer "which files are tracked" and "which commits
/// touched them, oldest first".
pub trait HistorySource {
    /// Repository-relative, `/`-separated paths of every tracked file.
    fn tracked_paths(&self) -> Result<Vec<String>, HistoryError>;

    /// Commits in logical order, oldest first.
    fn commits(&self) -> Result<Vec<CommitTouch>, HistoryError>;

    /// True when older history is known to be missing.
    fn is_shallow(&self) -> Result<bool, HistoryError>;

    /// Fallback file listing used when [`HistorySource::tracked_paths`] fails.
    fn working_tree_paths(&self) -> Result<Vec<String>, HistoryError> {
        Ok(Vec::new())
    }
}
