//! Shared pass entrypoint used by every CLI command.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use sweep_core::selector::{select, SelectionCriteria};
use sweep_core::types::{Degraded, Report, Selection};
use sweep_history::{scan, HistoryError, HistorySource};

use crate::error::PipelineError;
use crate::formatter::Formatter;
use crate::invoker::invoke;
use crate::report::report;

/// Scan and selection without formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub selection: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degraded>,
}

/// Outcome of one full pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassResult {
    pub report: Report,
    pub selection: Selection,
}

/// Scan history and select the next batch.
///
/// `criteria` is already validated, so the only failure left is a history
/// source that cannot list any files.
pub fn plan(
    criteria: &SelectionCriteria,
    history: &dyn HistorySource,
) -> Result<Plan, HistoryError> {
    let scanned = scan(history)?;
    let selection = select(&scanned.files, criteria);
    info!(
        tracked = scanned.files.len(),
        eligible = selection.eligible_count,
        selected = selection.len(),
        complete = selection.complete,
        "selected batch"
    );
    Ok(Plan {
        selection,
        degraded: scanned.degraded,
    })
}

/// Run one pass: scan → select → format → report.
///
/// Any error is fatal for the pass and no report is produced.
pub fn run(
    root: &Path,
    criteria: &SelectionCriteria,
    history: &dyn HistorySource,
    formatter: &dyn Formatter,
) -> Result<PassResult, PipelineError> {
    let Plan {
        selection,
        degraded,
    } = plan(criteria, history)?;
    let outcomes = invoke(root, &selection, formatter)?;
    let report = report(&selection, &outcomes).with_degraded(degraded);

    info!(
        modified = report.number_of_modified_files(),
        failed = report.failed_files.len(),
        complete = report.complete,
        "pass finished"
    );
    Ok(PassResult { report, selection })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use sweep_core::patterns::IgnoreSet;
    use sweep_history::CommitTouch;
    use tempfile::TempDir;

    use super::*;
    use crate::error::InvokeError;
    use crate::formatter::FormatterRun;

    struct StaticHistory {
        tracked: Vec<&'static str>,
        modified_in_order: Vec<&'static str>,
    }

    impl HistorySource for StaticHistory {
        fn tracked_paths(&self) -> Result<Vec<String>, HistoryError> {
            Ok(self.tracked.iter().map(|s| s.to_string()).collect())
        }

        fn commits(&self) -> Result<Vec<CommitTouch>, HistoryError> {
            Ok(self
                .modified_in_order
                .iter()
                .enumerate()
                .map(|(i, p)| CommitTouch {
                    id: format!("c{i}"),
                    committed_at: None,
                    modified: vec![p.to_string()],
                })
                .collect())
        }

        fn is_shallow(&self) -> Result<bool, HistoryError> {
            Ok(false)
        }
    }

    /// Appends a newline to every file it sees.
    struct Touch {
        calls: Cell<usize>,
    }

    impl Formatter for Touch {
        fn name(&self) -> &str {
            "touch"
        }

        fn format(&self, root: &Path, paths: &[String]) -> Result<FormatterRun, InvokeError> {
            self.calls.set(self.calls.get() + 1);
            for p in paths {
                let full = root.join(p);
                let mut content = fs::read_to_string(&full).unwrap();
                content.push('\n');
                fs::write(&full, content).unwrap();
            }
            Ok(FormatterRun::default())
        }
    }

    fn criteria(count: i64) -> SelectionCriteria {
        SelectionCriteria::new(count, IgnoreSet::empty()).unwrap()
    }

    fn history() -> StaticHistory {
        StaticHistory {
            tracked: vec!["a.py", "b.py", "c.py"],
            modified_in_order: vec!["a.py", "b.py", "c.py"],
        }
    }

    #[test]
    fn plan_picks_oldest_without_formatting() {
        let p = plan(&criteria(2), &history()).unwrap();
        let paths: Vec<_> = p.selection.paths().collect();
        assert_eq!(paths, ["a.py", "b.py"]);
        assert!(!p.selection.complete);
        assert_eq!(p.degraded, None);
    }

    #[test]
    fn run_formats_selected_batch_only() {
        let dir = TempDir::new().unwrap();
        for p in ["a.py", "b.py", "c.py"] {
            fs::write(dir.path().join(p), "x").unwrap();
        }
        let f = Touch {
            calls: Cell::new(0),
        };
        let result = run(dir.path(), &criteria(2), &history(), &f).unwrap();
        assert_eq!(result.report.modified_files, ["a.py", "b.py"]);
        assert_eq!(fs::read_to_string(dir.path().join("c.py")).unwrap(), "x");
        assert_eq!(f.calls.get(), 1);
    }

    #[test]
    fn zero_count_run_succeeds_without_formatting() {
        let dir = TempDir::new().unwrap();
        let f = Touch {
            calls: Cell::new(0),
        };
        let result = run(dir.path(), &criteria(0), &history(), &f).unwrap();
        assert!(result.report.is_success());
        assert!(result.report.modified_files.is_empty());
        assert!(!result.report.complete);
        assert_eq!(f.calls.get(), 0);
    }
}
