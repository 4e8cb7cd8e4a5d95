use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Calendar-scoped goals and journal, from yearly plans down to daily tasks.
/// Storage defaults to ~/.cadence/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "cad", version, about = "Plan, track and review work by calendar period")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Act as this owner instead of the configured one.
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}
