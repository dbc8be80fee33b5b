//! Command-line driver for raid battles.
//!
//! Runs a battle against a village layout on the session runtime and streams
//! its events as JSON lines, or inspects a recorded result log.
//!
//! ```bash
//! raid simulate --army "barbarian=10,archer=5" --fast
//! raid simulate --village base.json --deploy-at 1.5,20 --results out/results.jsonl
//! raid results out/results.jsonl
//! ```

mod army;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Results, Simulate};

/// Raid battle simulator
#[derive(Parser)]
#[command(name = "raid")]
#[command(about = "Simulate village raids and inspect their results", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run one battle and print its events
    Simulate(Simulate),

    /// Summarize a JSON-lines result log
    Results(Results),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for BATTLE_* overrides and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Simulate(cmd) => cmd.execute().await,
        Command::Results(cmd) => cmd.execute(),
    }
}
