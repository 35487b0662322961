//! Sweep — incremental formatting orchestrator CLI.
//!
//! # Usage
//!
//! ```text
//! sweep run     [--repo <dir>] [-n <N>] [--ignore <p1,p2>] [--output-file <file>] [--json]
//!               [--commit-message <file>] [--pr-body <file>] [--template-dir <dir>]
//!               [--formatter <program>] [--formatter-arg <arg>]... [--timeout-secs <S>]
//! sweep plan    [--repo <dir>] [-n <N>] [--ignore <p1,p2>] [--json]
//! sweep history [--repo <dir>] [--limit <N>] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{history::HistoryArgs, plan::PlanArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sweep",
    version,
    about = "Format a repository a batch at a time, least recently modified files first",
    long_about = None,
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Format the next batch and report what changed.
    Run(RunArgs),

    /// Show the next batch without formatting anything.
    Plan(PlanArgs),

    /// Show tracked files ordered by last modification.
    History(HistoryArgs),
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::History(args) => args.run(),
    }
}
