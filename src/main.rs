use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pocket_ledger::cli::{Cli, execute};
use pocket_ledger::db::connection::establish_connection;
use pocket_ledger::db::repository::SqliteStore;
use pocket_ledger::db::{KeyValueStore, MemoryStore};
use pocket_ledger::operations::ledger::{LedgerStore, today};

fn main() -> ExitCode {
    setup_logging();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> pocket_ledger::Result<()> {
    let storage: Box<dyn KeyValueStore> = if cli.in_memory {
        debug!("using in-memory storage");
        Box::new(MemoryStore::new())
    } else {
        debug!(db = %cli.db.display(), "opening database");
        Box::new(SqliteStore::new(establish_connection(&cli.db)?))
    };

    let mut ledger = LedgerStore::open(storage)?;
    let mut stdout = io::stdout().lock();
    execute(cli.command, &mut ledger, today(), &mut stdout)
}

/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG` overrides the level.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
