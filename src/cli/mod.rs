use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::database::seed::{seed_demo, SeedOptions, SeedOutcome};
use crate::database::{DatabaseManager, PgStore};

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio backend - content API for the personal site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply migrations and serve the API (default)")]
    Serve,

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Insert a demo owner with hero, about and projects")]
    Seed {
        #[arg(long, help = "Owner username", default_value = "demo")]
        username: String,
        #[arg(long, help = "Owner password", default_value = "demo123")]
        password: String,
        #[arg(long, help = "Display name", default_value = "Demo Developer")]
        name: String,
        #[arg(long, help = "Contact email", default_value = "demo@example.com")]
        email: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting portfolio API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    let store = PgStore::new(pool);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(store, config).await,
        Commands::Migrate => Ok(()),
        Commands::Seed { username, password, name, email } => {
            let opts = SeedOptions { username, password, name, email };
            match seed_demo(&store, &opts).await? {
                SeedOutcome::Created(user) => println!("Seeded demo content for '{}'", user.username),
                SeedOutcome::AlreadyPresent(user) => println!("User '{}' already exists, nothing to do", user.username),
            }
            Ok(())
        }
    }
}

async fn serve(store: PgStore, config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(Arc::new(store), config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
