//! Least-recently-modified batch selection.
//!
//! [`select`] is pure: identical inputs always produce an identical
//! [`Selection`]. Ordering is ascending recency, then ascending path.

use crate::error::ConfigError;
use crate::patterns::IgnoreSet;
use crate::types::{Selection, TrackedFile};

/// Validated batch size plus compiled ignore patterns.
///
/// Construction is the only place a negative count or a malformed pattern is
/// rejected, so holding a `SelectionCriteria` means the configuration is sound.
#[derive(Debug, Clone, Default)]
pub struct SelectionCriteria {
    count: usize,
    ignore: IgnoreSet,
}

impl SelectionCriteria {
    pub fn new(count: i64, ignore: IgnoreSet) -> Result<Self, ConfigError> {
        let count = usize::try_from(count).map_err(|_| ConfigError::NegativeCount(count))?;
        Ok(Self { count, ignore })
    }

    /// Validate `count`, then compile `patterns`.
    pub fn from_patterns<I, S>(count: i64, patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if count < 0 {
            return Err(ConfigError::NegativeCount(count));
        }
        Self::new(count, IgnoreSet::compile(patterns)?)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    pub fn is_eligible(&self, file: &TrackedFile) -> bool {
        !self.ignore.is_ignored(&file.path)
    }
}

/// Pick up to `criteria.count()` eligible files, least recently modified first.
///
/// `complete` is set when the batch covers the whole eligible set, which
/// includes the case of an empty eligible set with `count == 0`.
pub fn select(tracked: &[TrackedFile], criteria: &SelectionCriteria) -> Selection {
    let mut eligible: Vec<&TrackedFile> = tracked
        .iter()
        .filter(|f| criteria.is_eligible(f))
        .collect();
    eligible.sort_by(|a, b| a.recency.cmp(&b.recency).then_with(|| a.path.cmp(&b.path)));

    let eligible_count = eligible.len();
    let take = criteria.count().min(eligible_count);
    let files: Vec<TrackedFile> = eligible.into_iter().take(take).cloned().collect();

    Selection {
        complete: eligible_count <= criteria.count(),
        eligible_count,
        files,
    }
}
