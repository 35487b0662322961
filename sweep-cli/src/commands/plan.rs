//! `sweep plan` — dry run: show the next batch without formatting.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use sweep_format::{pipeline, Plan};
use sweep_history::GitHistory;

use super::{RepoArgs, SelectionArgs};

/// Arguments for `sweep plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "file")]
    path: String,
    #[tabled(rename = "recency")]
    recency: u64,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let root = self.repo.root()?;
        let config = self.repo.load_config(&root)?;
        let criteria = self.selection.criteria(&config)?;

        let plan = pipeline::plan(&criteria, &GitHistory::new(&root))
            .context("failed to read repository history")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("failed to serialize plan JSON")?
            );
            return Ok(());
        }
        print_plan(&plan);
        Ok(())
    }
}

fn print_plan(plan: &Plan) {
    if let Some(degraded) = &plan.degraded {
        println!("{} {degraded}; ordering is best-effort", "!".yellow().bold());
    }
    let selection = &plan.selection;
    println!(
        "Next batch: {} of {} eligible files{}",
        selection.len(),
        selection.eligible_count,
        if selection.complete {
            " (completes the sweep)".green().to_string()
        } else {
            String::new()
        }
    );
    if selection.is_empty() {
        return;
    }

    let rows: Vec<PlanRow> = selection
        .files
        .iter()
        .enumerate()
        .map(|(i, f)| PlanRow {
            position: i + 1,
            path: f.path.clone(),
            recency: f.recency.0,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
