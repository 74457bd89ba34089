mod cli;
mod commands;
mod render;

use std::io;

use clap::Parser;
use tracing::info;

use lostfound_db::DbConfig;

use crate::cli::Cli;
use crate::commands::Rejected;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout is for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lostfound=info,lostfound_db=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = DbConfig::from_env()?;
    if let Some(path) = cli.db {
        config.path = path;
    }
    info!("Using database {} ({} credentials)", config.path.display(), config.scheme);
    let db = config.open()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();

    let result = commands::run(cli.command, &db, &mut input, &mut out);
    db.close()?;

    match result {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<Rejected>() {
            Some(rejected) => {
                eprintln!("{}", rejected);
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}
