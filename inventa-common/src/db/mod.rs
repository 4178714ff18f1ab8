//! Database initialization and repositories
//!
//! SQLite via sqlx. Schema creation is idempotent (CREATE TABLE IF NOT
//! EXISTS) so startup doubles as migration for fresh deployments.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub mod articles;
pub mod sync_runs;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers while a sync run writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema, for tests
pub async fn init_in_memory() -> Result<SqlitePool> {
    // Single connection: each extra connection would see its own empty
    // in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Column definitions shared by the live table and the staging table used
/// during a full-replace pull
pub(crate) const ARTICLES_COLUMNS: &str = r#"
    placa TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    brand TEXT NOT NULL DEFAULT '',
    model TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    value REAL NOT NULL DEFAULT 0,
    acquired_date TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    owner TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    sequence TEXT NOT NULL DEFAULT '',
    item_type TEXT NOT NULL DEFAULT '',
    source_sheet TEXT NOT NULL DEFAULT ''
"#;

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // placa is indexed but deliberately not UNIQUE: the source spreadsheet
    // repeats tags across sheets and the full-replace pull keeps all of them
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS articles ({ARTICLES_COLUMNS})"
    ))
    .execute(pool)
    .await?;

    create_articles_indexes(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sync_runs (
            run_id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            state TEXT NOT NULL,
            outcome TEXT,
            rows INTEGER NOT NULL DEFAULT 0,
            error TEXT,
            started_at TEXT NOT NULL,
            ended_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub(crate) async fn create_articles_indexes(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_placa ON articles (placa)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_category ON articles (category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_owner ON articles (owner)")
        .execute(pool)
        .await?;
    Ok(())
}
