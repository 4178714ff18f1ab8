//! inventa-sync - inventory backend with spreadsheet reconciliation
//!
//! Serves the inventory query API over a local SQLite store and runs
//! background pull/push reconciliation against a Google Sheets document.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use inventa_common::config::Config;
use inventa_sync::sheets::GoogleSheetsClient;
use inventa_sync::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "inventa-sync", version, about = "Inventory sheet reconciliation service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "INVENTA_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification logged before any database delay
    info!(
        "Starting inventa-sync v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    info!("Database path: {}", config.database_path);

    let db_path = PathBuf::from(&config.database_path);
    let pool = inventa_common::db::init_database(&db_path).await?;

    let sheets = Arc::new(GoogleSheetsClient::new(&config.sheets)?);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config, sheets);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("inventa-sync listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
