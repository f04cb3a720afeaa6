use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use energy_tracker::app::{AppState, Repositories, build_app};
use energy_tracker::config::AppConfig;
use energy_tracker::models::catalog::catalog;

#[derive(Parser)]
#[command(name = "energy-tracker", version, about = "Household energy tracking API")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ENERGY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the appliance catalog as JSON
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("energy_tracker=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Catalog => {
            println!("{}", serde_json::to_string_pretty(&catalog())?);
            Ok(())
        }
        Command::Serve => serve(cli.config).await,
    }
}

async fn serve(config_file: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AppConfig::load(config_file.as_deref())?;
    config.validate()?;

    let repositories = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed");

            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("No database URL configured; using the in-memory store");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(&config, repositories)?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "Server running");
    tracing::info!("API docs at http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
