//! # ONG Backend Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use ong::{config::ConfigLoader, db, seeds, server::run_server, telemetry::init_tracing};

#[derive(Debug, Parser)]
#[command(name = "ong", version, about = "ONG users and authentication API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Apply migrations, insert the demo data and exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    init_tracing(&config).context("initializing tracing")?;

    tracing::info!(profile = %config.profile, "configuration loaded");
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "effective configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    Migrator::up(&db, None).await.context("running migrations")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            tracing::info!("migrations applied");
        }
        Command::Seed => {
            seeds::seed_all(&db).await.context("seeding database")?;
        }
        Command::Serve => {
            if config.seed_on_startup {
                seeds::seed_all(&db).await.context("seeding database")?;
            }
            run_server(Arc::new(config), db).await?;
        }
    }

    Ok(())
}
