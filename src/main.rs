//! Reciclo - recycling management service.
//!
//! Material review, points, and collection history behind a JSON API.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reciclo::{
    api::{self, ApiState},
    config::AppConfig,
    db, seed,
    store::Store,
};

/// Recycling management service.
#[derive(Parser)]
#[command(name = "reciclo", about = "Recycling management service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API daemon.
    Daemon {
        /// Address to bind the API server.
        #[arg(long, default_value = "0.0.0.0:7070", env = "RECICLO_BIND")]
        bind: String,

        /// SQLite database URL.
        #[arg(long, default_value = "sqlite:reciclo.db", env = "DATABASE_URL")]
        database_url: String,

        /// Points granted on approval when the curator does not specify any.
        #[arg(long, default_value_t = 50, env = "RECICLO_DEFAULT_AWARD")]
        default_award: i64,
    },

    /// Show service status.
    Status {
        /// Reciclo API URL.
        #[arg(long, env = "RECICLO_API_URL", default_value = "http://localhost:7070")]
        api_url: String,
    },

    /// Insert demo users, spaces, and events into an empty database.
    Seed {
        /// SQLite database URL.
        #[arg(long, default_value = "sqlite:reciclo.db", env = "DATABASE_URL")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reciclo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon {
            bind,
            database_url,
            default_award,
        } => {
            run_daemon(&bind, &database_url, default_award).await?;
        }

        Commands::Status { api_url } => {
            show_status(&api_url).await?;
        }

        Commands::Seed { database_url } => {
            run_seed(&database_url).await?;
        }
    }

    Ok(())
}

/// Run the API daemon.
async fn run_daemon(bind: &str, database_url: &str, default_award: i64) -> Result<()> {
    tracing::info!("Starting reciclo daemon...");

    let config = AppConfig::new(bind, database_url).with_default_award(default_award);

    let pool = db::connect(database_url).await?;
    db::init_database(&pool).await?;

    let store = Store::new(pool);
    let state = Arc::new(ApiState::new(store, config));

    api::serve(state, bind).await?;

    Ok(())
}

/// Show service status via API.
async fn show_status(api_url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/status", api_url);

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to get status: {}", response.status());
    }

    let status: serde_json::Value = response.json().await?;

    println!("Reciclo Status");
    println!("==============");
    println!("Status:            {}", status["status"]);
    println!("Users:             {}", status["users"]);
    println!("Pending Materials: {}", status["pending_materials"]);

    Ok(())
}

/// Seed demo data.
async fn run_seed(database_url: &str) -> Result<()> {
    let pool = db::connect(database_url).await?;
    db::init_database(&pool).await?;

    let store = Store::new(pool);
    seed::seed_demo_data(&store).await?;

    println!("Demo data ready.");

    Ok(())
}
