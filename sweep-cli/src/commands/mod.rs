pub mod history;
pub mod plan;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use sweep_core::patterns::split_pattern_list;
use sweep_core::{config, SelectionCriteria, SweepConfig};

/// Repository location and config file, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository root (working tree).
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Config file to use instead of `<repo>/.sweep.yaml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RepoArgs {
    pub fn root(&self) -> Result<PathBuf> {
        std::fs::canonicalize(&self.repo)
            .with_context(|| format!("repository '{}' not found", self.repo.display()))
    }

    pub fn load_config(&self, root: &Path) -> Result<SweepConfig> {
        match &self.config {
            Some(path) => config::load_file(path)
                .with_context(|| format!("invalid config file '{}'", path.display())),
            None => config::load_at(root).with_context(|| {
                format!(
                    "invalid config file '{}'",
                    config::config_path_at(root).display()
                )
            }),
        }
    }
}

/// Batch size and ignore overrides.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Number of files to format in this pass (overrides config).
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub number_of_files: Option<i64>,

    /// Comma-separated ignore patterns (globs, or `re:<regex>`); replaces the config list.
    #[arg(long)]
    pub ignore: Option<String>,
}

impl SelectionArgs {
    /// Validate criteria before any history is read.
    pub fn criteria(&self, config: &SweepConfig) -> Result<SelectionCriteria> {
        let ignore = self.ignore.as_deref().map(split_pattern_list);
        config
            .criteria(self.number_of_files, ignore.as_deref())
            .context("invalid selection criteria")
    }
}
