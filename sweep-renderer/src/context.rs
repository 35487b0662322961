//! Template context — serializable rendering payload built from a [`Report`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweep_core::types::Report;

use crate::error::RenderError;

/// Rendering payload for commit-message and PR-body templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContext {
    /// Files the formatter changed, lexical order.
    pub modified_files: Vec<String>,
    /// Files the formatter could not process, lexical order.
    pub failed_files: Vec<FailedFileCtx>,
    pub number_of_modified_files: usize,
    pub number_of_failed_files: usize,
    /// Size of the batch this pass formatted.
    pub number_of_selected_files: usize,
    /// This pass covered every remaining eligible file.
    pub complete: bool,
    /// Human-readable history degradation, if any.
    pub degraded: Option<String>,
    pub meta: MetaCtx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFileCtx {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub sweep_version: String,
    pub generated_at: Option<DateTime<Utc>>,
}

impl ReportContext {
    /// Build a [`ReportContext`] from a [`Report`].
    pub fn from_report(report: &Report) -> Self {
        let failed_files: Vec<FailedFileCtx> = report
            .failed_files
            .iter()
            .map(|(path, reason)| FailedFileCtx {
                path: path.clone(),
                reason: reason.clone(),
            })
            .collect();

        ReportContext {
            modified_files: report.modified_files.clone(),
            number_of_modified_files: report.number_of_modified_files(),
            number_of_failed_files: failed_files.len(),
            number_of_selected_files: report.selected_files.len(),
            failed_files,
            complete: report.complete,
            degraded: report.degraded.as_ref().map(ToString::to_string),
            meta: MetaCtx {
                sweep_version: env!("CARGO_PKG_VERSION").to_string(),
                generated_at: None,
            },
        }
    }

    /// Stamp the render time into `meta.generated_at`.
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.meta.generated_at = Some(at);
        self
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
