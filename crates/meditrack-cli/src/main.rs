//! MediTrack CLI

use std::process;

use anyhow::Context;
use meditrack_cli::{commands, logging, Config};
use meditrack_core::ApiResponse;
use meditrack_core::db::Database;
use tracing::info;

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    match run(config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            let envelope = ApiResponse::<()>::failure(format!("{error:#}"));
            println!(
                "{}",
                serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| format!("{error:#}"))
            );
            process::exit(1);
        }
    }
}

fn run(config: Config) -> anyhow::Result<bool> {
    logging::init(&config)?;

    let db = Database::open(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.display()))?;
    info!(database = %config.database.display(), "opened database");

    let actor = commands::resolve_actor(&db, &config.identity)?;
    let envelope = commands::execute(config.command, &db, &actor)?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(envelope.success)
}
