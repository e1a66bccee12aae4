//! `adapt` CLI entry-point.
//!
//! Available sub-commands:
//! - `admin`   — serve the admin console.
//! - `viewer`  — serve the public viewer.
//! - `migrate` — create the contributions table.
//! - `analyze` — print metadata and the water body count of a GeoTIFF.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{AppState, Settings};

#[derive(Parser)]
#[command(
    name = "adapt",
    about = "Admin console and public viewer for the water body mapping project",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the admin console.
    Admin {
        #[arg(long, env = "ADAPT_ADMIN_BIND", default_value = "0.0.0.0:8501")]
        bind: String,
        /// TOML settings file.
        #[arg(long, env = "ADAPT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Serve the public viewer.
    Viewer {
        #[arg(long, env = "ADAPT_VIEWER_BIND", default_value = "0.0.0.0:8502")]
        bind: String,
        /// TOML settings file.
        #[arg(long, env = "ADAPT_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Create the contributions table if it does not exist.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Analyse a GeoTIFF file and print the result as JSON.
    Analyze {
        /// Path to the GeoTIFF.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Admin { bind, config } => {
            let state = load_state(config).await?;
            info!("Starting admin console on {bind}");
            api::serve(&bind, api::build_admin_router(state)).await?;
        }
        Command::Viewer { bind, config } => {
            let state = load_state(config).await?;
            info!("Starting public viewer on {bind}");
            api::serve(&bind, api::build_viewer_router(state)).await?;
        }
        Command::Migrate { database_url } => {
            info!("Running migrations against {database_url}");
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Analyze { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("cannot read file {}", path.display()))?;
            let analysis = raster::analyze(&bytes)
                .with_context(|| format!("cannot analyse {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
    }

    Ok(())
}

async fn load_state(config: Option<PathBuf>) -> anyhow::Result<AppState> {
    let settings = Settings::load(config.as_deref()).await?;
    AppState::init(settings)
        .await
        .context("failed to initialise dashboard state")
}
