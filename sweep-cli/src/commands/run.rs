//! `sweep run` — format the next batch and report the outcome.
//!
//! Any error (bad config, unusable formatter, unreadable repository) is fatal:
//! the output file then carries only `status=fatal` and the process exits
//! non-zero, so nothing downstream acts on a partial result.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use sweep_core::{FormatterConfig, Report};
use sweep_format::{pipeline, CommandFormatter, Outputs, PassResult};
use sweep_history::GitHistory;
use sweep_renderer::{ReportContext, ReportRenderer, TemplateKind};

use super::{RepoArgs, SelectionArgs};

/// Arguments for `sweep run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Append `key=value` outputs to this file (e.g. `$GITHUB_OUTPUT`).
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Write a rendered commit message to this file.
    #[arg(long)]
    pub commit_message: Option<PathBuf>,

    /// Write a rendered pull-request body to this file.
    #[arg(long)]
    pub pr_body: Option<PathBuf>,

    /// Directory of `.tera` templates overriding the built-in ones.
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Formatter program (overrides config).
    #[arg(long)]
    pub formatter: Option<String>,

    /// Argument passed to the formatter before the file list; repeatable.
    /// Replaces the configured args.
    #[arg(long = "formatter-arg", allow_hyphen_values = true)]
    pub formatter_args: Vec<String>,

    /// Kill the formatter after this many seconds (overrides config).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON shape printed by `sweep run --json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunJson<'a> {
    number_of_modified_files: usize,
    #[serde(flatten)]
    report: &'a Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        match self.execute() {
            Ok(result) => {
                if let Some(path) = &self.output_file {
                    write_outputs(path, &Outputs::from(&result.report))?;
                }
                if self.json {
                    print_json(&result.report, None)?;
                } else {
                    print_summary(&result);
                }
                Ok(())
            }
            Err(err) => {
                let fatal = Report::fatal();
                if let Some(path) = &self.output_file {
                    write_outputs(path, &Outputs::from(&fatal))?;
                }
                if self.json {
                    print_json(&fatal, Some(format!("{err:#}")))?;
                }
                Err(err)
            }
        }
    }

    fn execute(&self) -> Result<PassResult> {
        let root = self.repo.root()?;
        let config = self.repo.load_config(&root)?;
        let criteria = self.selection.criteria(&config)?;
        let formatter = CommandFormatter::from_config(&self.formatter_config(&config.formatter))
            .context("invalid formatter configuration")?;
        // Load templates before any file is rewritten.
        let renderer = self.renderer()?;

        let history = GitHistory::new(&root);
        let result = pipeline::run(&root, &criteria, &history, &formatter)
            .context("formatting pass failed")?;

        if let Some(renderer) = renderer {
            self.write_rendered(&renderer, &result.report)?;
        }
        Ok(result)
    }

    fn formatter_config(&self, base: &FormatterConfig) -> FormatterConfig {
        let mut config = base.clone();
        if let Some(program) = &self.formatter {
            config.command = program.clone();
        }
        if !self.formatter_args.is_empty() {
            config.args = self.formatter_args.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        config
    }

    fn renderer(&self) -> Result<Option<ReportRenderer>> {
        if self.commit_message.is_none() && self.pr_body.is_none() {
            return Ok(None);
        }
        let renderer = ReportRenderer::new(self.template_dir.as_deref())
            .context("failed to load report templates")?;
        Ok(Some(renderer))
    }

    fn write_rendered(&self, renderer: &ReportRenderer, report: &Report) -> Result<()> {
        let ctx = ReportContext::from_report(report).generated_at(Utc::now());
        let targets = [
            (TemplateKind::CommitMessage, &self.commit_message),
            (TemplateKind::PrBody, &self.pr_body),
        ];
        for (kind, target) in targets {
            let Some(path) = target else { continue };
            let text = renderer
                .render(kind, &ctx)
                .with_context(|| format!("failed to render {}", kind.template_name()))?;
            std::fs::write(path, text)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
        }
        Ok(())
    }
}

fn write_outputs(path: &Path, outputs: &Outputs) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open output file '{}'", path.display()))?;
    file.write_all(outputs.to_key_values().as_bytes())
        .with_context(|| format!("failed to write output file '{}'", path.display()))
}

fn print_json(report: &Report, error: Option<String>) -> Result<()> {
    let payload = RunJson {
        number_of_modified_files: report.number_of_modified_files(),
        report,
        error,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize run JSON")?
    );
    Ok(())
}

fn print_summary(result: &PassResult) {
    let report = &result.report;
    if let Some(degraded) = &report.degraded {
        println!("{} {degraded}; ordering is best-effort", "!".yellow().bold());
    }
    if result.selection.is_empty() {
        println!("{} nothing to format", "✓".green().bold());
        return;
    }

    println!(
        "{} formatted {} of {} eligible files ({} modified, {} failed)",
        "✓".green().bold(),
        result.selection.len(),
        result.selection.eligible_count,
        report.number_of_modified_files(),
        report.failed_files.len(),
    );
    for path in &report.modified_files {
        println!("  ✎  {path}");
    }
    for (path, reason) in &report.failed_files {
        println!("  {}  {path}: {}", "✗".red(), reason.bright_black());
    }
    if report.complete {
        println!("{}", "All eligible files covered; the sweep is complete.".green());
    } else {
        println!("More files remain; run again after this batch is merged.");
    }
}
