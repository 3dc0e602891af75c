//! classpulse-server - HTTP API for the school activity dashboard
//!
//! Serves activity charts, insight cards, the AI pulse and teacher summaries
//! from the classpulse database.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/classpulse/data.db (~/.local/share/classpulse/data.db)
//! - Logs: $XDG_STATE_HOME/classpulse/classpulse.log (~/.local/state/classpulse/classpulse.log)
//! - Config: $XDG_CONFIG_HOME/classpulse/config.toml (~/.config/classpulse/config.toml)

mod error;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use classpulse_core::{Config, Database};

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "classpulse-server")]
#[command(about = "Serve the classpulse dashboard API")]
#[command(version)]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/classpulse/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding config and PORT
    #[arg(short, long)]
    bind: Option<String>,

    /// Database file, overriding config
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => {
            let mut config = Config::load_from(path).context("failed to load configuration")?;
            config.admin.apply_env_overrides();
            config
        }
        None => Config::load().context("failed to load configuration")?,
    };

    // Initialize logging
    let _log_guard =
        classpulse_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("classpulse-server starting");

    let db_path = args
        .database
        .unwrap_or_else(|| config.resolved_database_path());
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let bind = args.bind.unwrap_or_else(|| {
        config
            .server
            .bind_with_port(std::env::var("PORT").ok().as_deref())
    });

    let state = AppState::new(Arc::new(db), config.admin);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind to {}", bind))?;

    tracing::info!(%bind, "Server listening");
    println!("classpulse-server listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("classpulse-server shutting down");
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, draining connections"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
