//! Tera rendering engine — [`TemplateKind`] enum and [`ReportRenderer`].
//!
//! | Kind            | Template name           |
//! |-----------------|-------------------------|
//! | CommitMessage   | `commit_message.tera`   |
//! | PrBody          | `pr_body.md.tera`       |
//!
//! A user template directory may replace either file by placing a file with
//! the same name directly inside it. Anything else in the directory is
//! ignored.

use std::io::ErrorKind;
use std::path::Path;

use tera::Tera;

use crate::context::ReportContext;
use crate::error::{io_err, RenderError};

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Texts produced for the PR automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    CommitMessage,
    PrBody,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        &[TemplateKind::CommitMessage, TemplateKind::PrBody]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            TemplateKind::CommitMessage => "commit_message.tera",
            TemplateKind::PrBody => "pr_body.md.tera",
        }
    }

    /// Default template baked into the binary.
    fn embedded(&self) -> &'static str {
        match self {
            TemplateKind::CommitMessage => include_str!("templates/commit_message.tera"),
            TemplateKind::PrBody => include_str!("templates/pr_body.md.tera"),
        }
    }
}

// ---------------------------------------------------------------------------
// Template loading
// ---------------------------------------------------------------------------

/// Read `<dir>/<template_name>` if it exists.
fn load_override(dir: &Path, kind: TemplateKind) -> Result<Option<String>, RenderError> {
    let path = dir.join(kind.template_name());
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(&path, e)),
    }
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates = Vec::with_capacity(TemplateKind::all().len());
    for kind in TemplateKind::all() {
        let user = match user_template_dir {
            Some(dir) => load_override(dir, *kind)?,
            None => None,
        };
        let content = user.unwrap_or_else(|| kind.embedded().to_string());
        templates.push((kind.template_name(), content));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ReportRenderer
// ---------------------------------------------------------------------------

/// Renders report texts from embedded templates plus optional overrides.
///
/// Create once with [`ReportRenderer::new`] and reuse.
pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    /// Load embedded templates, replacing each with the same-named file in
    /// `user_template_dir` when present (a missing directory is ignored).
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(ReportRenderer {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// Render one text. Output always uses LF line endings.
    pub fn render(&self, kind: TemplateKind, ctx: &ReportContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(kind.template_name(), &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use sweep_core::types::{Report, RunStatus};

    fn make_report(modified: &[&str], failed: &[(&str, &str)], complete: bool) -> Report {
        Report {
            modified_files: modified.iter().map(|s| s.to_string()).collect(),
            failed_files: failed
                .iter()
                .map(|(p, r)| (p.to_string(), r.to_string()))
                .collect::<BTreeMap<_, _>>(),
            complete,
            status: RunStatus::Success,
            selected_files: modified
                .iter()
                .chain(failed.iter().map(|(p, _)| p))
                .map(|s| s.to_string())
                .collect(),
            degraded: None,
        }
    }

    fn render(kind: TemplateKind, report: &Report) -> String {
        ReportRenderer::new(None)
            .unwrap()
            .render(kind, &ReportContext::from_report(report))
            .unwrap()
    }

    #[test]
    fn renderer_new_succeeds() {
        ReportRenderer::new(None).expect("embedded templates should load");
    }

    #[test]
    fn commit_message_lists_modified_files() {
        let msg = render(TemplateKind::CommitMessage, &make_report(&["a.py", "b.py"], &[], false));
        assert!(msg.starts_with("Format 2 least recently modified files\n"));
        assert!(msg.contains("- a.py\n- b.py\n"));
        assert!(!msg.contains("Skipped"));
    }

    #[test]
    fn commit_message_singular_and_failures() {
        let msg = render(
            TemplateKind::CommitMessage,
            &make_report(&["a.py"], &[("b.py", "Cannot parse")], false),
        );
        assert!(msg.starts_with("Format 1 least recently modified file\n"));
        assert!(msg.contains("Skipped 1 file the formatter could not process."));
    }

    #[test]
    fn pr_body_mentions_completion() {
        let done = render(TemplateKind::PrBody, &make_report(&["a.py"], &[], true));
        assert!(done.contains("The sweep is complete."));
        let more = render(TemplateKind::PrBody, &make_report(&["a.py"], &[], false));
        assert!(more.contains("More files remain"));
    }

    #[test]
    fn pr_body_tabulates_failures() {
        let body = render(
            TemplateKind::PrBody,
            &make_report(&["a.py"], &[("b.py", "Cannot parse: 1:4")], false),
        );
        assert!(body.contains("| `b.py` | Cannot parse: 1:4 |"));
        assert!(body.contains("- `a.py`"));
    }

    #[test]
    fn pipes_in_failure_rows_are_escaped() {
        let body = render(
            TemplateKind::PrBody,
            &make_report(&[], &[("b|c.py", "expected one of: | or )")], false),
        );
        assert!(
            body.contains("| `b\\|c.py` | expected one of: \\| or ) |"),
            "{body}"
        );
    }

    #[test]
    fn no_crlf_in_any_rendered_output() {
        let report = make_report(&["a.py"], &[("b.py", "x")], true);
        for kind in TemplateKind::all() {
            assert!(!render(*kind, &report).contains('\r'), "{kind:?} contains CR");
        }
    }
}
