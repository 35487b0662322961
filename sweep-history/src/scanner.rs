//! History scanner: tracked files plus a logical recency per file.
//!
//! Recency is the 1-based position of the last commit that modified the path
//! in oldest-first order. Files never modified after they were added keep
//! [`Recency::EARLIEST`].
//!
//! Missing or shallow history never fails the scan; it marks the result as
//! [`Degraded`] and the ordering falls back to lexical path order for the
//! files it cannot place.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use sweep_core::types::{Degraded, Recency, TrackedFile};

use crate::error::HistoryError;
use crate::source::HistorySource;

/// Tracked files (lexical order) and whether the ordering is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanResult {
    pub files: Vec<TrackedFile>,
    pub degraded: Option<Degraded>,
}

/// Derive a recency for every tracked file.
///
/// Returns an error only if no file listing can be produced at all.
pub fn scan(source: &dyn HistorySource) -> Result<ScanResult, HistoryError> {
    let (mut paths, mut degraded) = match source.tracked_paths() {
        Ok(paths) => (paths, None),
        Err(err) => {
            warn!(error = %err, "tracked files unavailable; walking working tree");
            let paths = source.working_tree_paths()?;
            (paths, Some(Degraded::Unavailable(err.to_string())))
        }
    };
    paths.sort();
    paths.dedup();

    let mut last_touch: HashMap<String, (Recency, Option<DateTime<Utc>>)> = HashMap::new();
    if degraded.is_none() {
        match source.commits() {
            Ok(commits) => {
                for (idx, commit) in commits.into_iter().enumerate() {
                    let recency = Recency(idx as u64 + 1);
                    for path in commit.modified {
                        last_touch.insert(path, (recency, commit.committed_at));
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "commit history unavailable; ordering by path only");
                degraded = Some(Degraded::NoHistory(err.to_string()));
            }
        }
    }

    if degraded.is_none() {
        match source.is_shallow() {
            Ok(true) => {
                warn!("shallow history; recency ordering is best-effort");
                degraded = Some(Degraded::Shallow);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(error = %err, "could not determine history depth");
                degraded = Some(Degraded::NoHistory(err.to_string()));
            }
        }
    }

    let files: Vec<TrackedFile> = paths
        .into_iter()
        .map(|path| {
            let (recency, last_touched_at) = last_touch
                .get(&path)
                .copied()
                .unwrap_or((Recency::EARLIEST, None));
            TrackedFile {
                path,
                recency,
                last_touched_at,
            }
        })
        .collect();

    debug!(
        files = files.len(),
        touched = last_touch.len(),
        degraded = degraded.is_some(),
        "history scan finished"
    );
    Ok(ScanResult { files, degraded })
}
