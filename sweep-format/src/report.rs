//! Result reporter.
//!
//! Turns a selection plus per-file outcomes into the [`Report`] handed to the
//! calling workflow, and flattens it into the `key=value` outputs.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::debug;

use sweep_core::types::{FormatOutcome, Outcomes, Report, RunStatus, Selection};

/// Aggregate outcomes for `selection` into a [`Report`].
///
/// Outcomes for paths outside the selection are dropped. Status is always
/// [`RunStatus::Success`] here; fatal runs never reach the reporter.
pub fn report(selection: &Selection, outcomes: &Outcomes) -> Report {
    let mut modified_files = Vec::new();
    let mut failed_files = BTreeMap::new();

    for (path, outcome) in outcomes {
        if !selection.contains(path) {
            debug!(path = %path, "dropping outcome for unselected path");
            continue;
        }
        match outcome {
            FormatOutcome::Modified => modified_files.push(path.clone()),
            FormatOutcome::Failed(reason) => {
                failed_files.insert(path.clone(), reason.clone());
            }
            FormatOutcome::Unchanged => {}
        }
    }
    modified_files.sort();

    let mut selected_files: Vec<String> = selection.paths().map(str::to_string).collect();
    selected_files.sort();

    Report {
        modified_files,
        failed_files,
        complete: selection.complete,
        status: RunStatus::Success,
        selected_files,
        degraded: None,
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// The flat outputs consumed by the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outputs {
    pub number_of_modified_files: usize,
    pub modified_file_names: Vec<String>,
    pub complete: bool,
    pub status: RunStatus,
}

impl From<&Report> for Outputs {
    fn from(report: &Report) -> Self {
        Self {
            number_of_modified_files: report.number_of_modified_files(),
            modified_file_names: report.modified_files.clone(),
            complete: report.complete,
            status: report.status,
        }
    }
}

impl Outputs {
    /// `key=value` lines, one per output, LF-terminated.
    ///
    /// A fatal run writes `status=fatal` and nothing else.
    pub fn to_key_values(&self) -> String {
        let mut out = String::new();
        if self.status == RunStatus::Fatal {
            let _ = writeln!(out, "status={}", self.status);
            return out;
        }
        let _ = writeln!(out, "numberOfModifiedFiles={}", self.number_of_modified_files);
        let _ = writeln!(out, "modifiedFileNames={}", self.modified_file_names.join(" "));
        let _ = writeln!(out, "complete={}", self.complete);
        let _ = writeln!(out, "status={}", self.status);
        out
    }
}
