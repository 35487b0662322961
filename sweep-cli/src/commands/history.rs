//! `sweep history` — tracked files ordered by last modification.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sweep_core::types::{Degraded, TrackedFile};
use sweep_history::{scan, GitHistory};

use super::RepoArgs;

/// Arguments for `sweep history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Show only the first N files.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct HistoryJson<'a> {
    tracked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    degraded: Option<&'a Degraded>,
    files: &'a [TrackedFile],
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "file")]
    path: String,
    #[tabled(rename = "recency")]
    recency: u64,
    #[tabled(rename = "last modified")]
    last_modified: String,
}

impl HistoryArgs {
    pub fn run(self) -> Result<()> {
        let root = self.repo.root()?;
        let scanned = scan(&GitHistory::new(&root)).context("failed to read repository history")?;
        let tracked = scanned.files.len();

        let mut files = scanned.files;
        files.sort_by(|a, b| a.recency.cmp(&b.recency).then_with(|| a.path.cmp(&b.path)));
        if let Some(limit) = self.limit {
            files.truncate(limit);
        }

        if self.json {
            let payload = HistoryJson {
                tracked,
                degraded: scanned.degraded.as_ref(),
                files: &files,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize history JSON")?
            );
            return Ok(());
        }

        if let Some(degraded) = &scanned.degraded {
            println!("{} {degraded}; ordering is best-effort", "!".yellow().bold());
        }
        println!("{tracked} tracked files, least recently modified first");
        if files.is_empty() {
            return Ok(());
        }
        let rows: Vec<HistoryRow> = files
            .into_iter()
            .map(|f| HistoryRow {
                last_modified: format_touched(f.last_touched_at),
                recency: f.recency.0,
                path: f.path,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn format_touched(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "never".bright_black().to_string(),
    }
}
