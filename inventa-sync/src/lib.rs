//! inventa-sync library - inventory service over a spreadsheet source
//!
//! Exposes the HTTP API (inventory queries + background sync jobs) and the
//! reconciliation pipeline. The binary in `main.rs` wires configuration,
//! database and router together.

pub mod api;
pub mod error;
pub mod ingest;
pub mod pagination;
pub mod reconciler;
pub mod sheets;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use inventa_common::config::Config;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::sheets::SheetService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service configuration (column mapping, sheet connection, defaults)
    pub config: Arc<Config>,
    /// Spreadsheet client (swappable for tests)
    pub sheets: Arc<dyn SheetService>,
    /// Single-slot lock serializing pull and push runs
    pub sync_lock: Arc<Mutex<()>>,
    /// Cancellation tokens for active sync runs
    pub cancel_tokens: Arc<RwLock<HashMap<Uuid, CancellationToken>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config, sheets: Arc<dyn SheetService>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sheets,
            sync_lock: Arc::new(Mutex::new(())),
            cancel_tokens: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::article_routes())
        .merge(api::sync_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
