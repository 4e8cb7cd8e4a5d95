//! `cad`: plan, track and review work by calendar period.
//!
//! ```bash
//! cad add "Ship the beta" --scale quarter --at 2025-Q3
//! cad add "Write launch post" --scale month --at 2025-07 --parent 1
//! cad plan --scale month --at 2025-07
//! cad trend --scale month --at 2025-07 --by week
//! cad journal add "Slow start, strong finish" --scale week
//! ```
//!
//! Data is stored in `~/.cadence/tasks.json` (or `$CADENCE_HOME`). Set
//! `RUST_LOG=debug` to see hierarchy and period decisions on stderr.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cadence::cli::Cli;
use cadence::cmd::{cmd_completions, run, Commands, Session};
use cadence::config::{process_env, Config, Paths};
use cadence::db::Database;
use cadence::Result;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn start(cli: Cli) -> Result<()> {
    // Completions need neither config nor database.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let paths = Paths::resolve(cli.db, process_env);
    let config = Config::load_or_init(&paths.config_file)?.with_env(process_env)?;
    let owner = cli.owner.unwrap_or(config.owner);
    tracing::debug!(db = %paths.db_file.display(), %owner, "starting");

    let mut session = Session {
        db: Database::load(&paths.db_file)?,
        db_path: paths.db_file,
        owner,
        default_scale: config.default_scale,
        json: cli.json,
    };
    run(&mut session, cli.command)
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = start(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
