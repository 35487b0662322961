//! Domain types for a single sweep pass.
//!
//! Paths are repository-relative strings with `/` separators; they are the
//! unique key for a tracked file and sort lexically by byte order.
//! All report types are serializable via serde so the CLI can emit them as JSON.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Recency
// ---------------------------------------------------------------------------

/// Logical commit-order counter for the last commit that modified a file.
///
/// Lower means less recently touched. [`Recency::EARLIEST`] is given to files
/// never modified after they were added.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Recency(pub u64);

impl Recency {
    pub const EARLIEST: Recency = Recency(0);
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Recency {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

// ---------------------------------------------------------------------------
// TrackedFile
// ---------------------------------------------------------------------------

/// A file under version control together with its recency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    pub path: String,
    pub recency: Recency,
    /// Timestamp of the commit that set `recency`. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_touched_at: Option<DateTime<Utc>>,
}

impl TrackedFile {
    pub fn new(path: impl Into<String>, recency: impl Into<Recency>) -> Self {
        Self {
            path: path.into(),
            recency: recency.into(),
            last_touched_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The batch chosen for one pass, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selection {
    pub files: Vec<TrackedFile>,
    /// True when this batch covers every eligible file.
    pub complete: bool,
    /// Size of the eligible set the batch was drawn from.
    pub eligible_count: usize,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Selected paths in selection order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of formatting one selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum FormatOutcome {
    Modified,
    Unchanged,
    Failed(String),
}

impl FormatOutcome {
    pub fn is_modified(&self) -> bool {
        matches!(self, FormatOutcome::Modified)
    }
}

/// Per-path outcomes for a batch, keyed by repository-relative path.
pub type Outcomes = BTreeMap<String, FormatOutcome>;

// ---------------------------------------------------------------------------
// Degraded history
// ---------------------------------------------------------------------------

/// Why the recency ordering is best-effort. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Degraded {
    /// The clone is shallow; older commits are missing.
    Shallow,
    /// Commit history could not be read (e.g. no commits yet).
    NoHistory(String),
    /// Tracked files could not be listed; the working tree was walked instead.
    Unavailable(String),
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degraded::Shallow => write!(f, "shallow history"),
            Degraded::NoHistory(detail) => write!(f, "no commit history: {detail}"),
            Degraded::Unavailable(detail) => write!(f, "revision history unavailable: {detail}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Overall outcome of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Success,
    Fatal,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Fatal => write!(f, "fatal"),
        }
    }
}

/// Deterministic summary of a pass handed to the calling workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Files the formatter changed, lexical order.
    pub modified_files: Vec<String>,
    /// Files the formatter could not process, with the reason.
    pub failed_files: BTreeMap<String, String>,
    pub complete: bool,
    pub status: RunStatus,
    /// Every file in the batch, lexical order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degraded>,
}

impl Report {
    /// The report shape for an aborted run. Nothing in it may be acted upon.
    pub fn fatal() -> Self {
        Self {
            status: RunStatus::Fatal,
            ..Self::default()
        }
    }

    pub fn with_degraded(mut self, degraded: Option<Degraded>) -> Self {
        self.degraded = degraded;
        self
    }

    pub fn number_of_modified_files(&self) -> usize {
        self.modified_files.len()
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
