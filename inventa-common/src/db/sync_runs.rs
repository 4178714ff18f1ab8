//! Sync run persistence
//!
//! Every background pull/push run is recorded here so its outcome can be
//! queried after the 202 acknowledgement, including degraded and failed
//! states.

use crate::models::{RunKind, RunState, SyncRun, SyncStatus};
use crate::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert or update a sync run
pub async fn save_run(pool: &SqlitePool, run: &SyncRun) -> Result<()> {
    let run_id = run.run_id.to_string();
    let kind = serde_json::to_string(&run.kind)
        .map_err(|e| Error::Internal(format!("Failed to serialize kind: {}", e)))?;
    let state = serde_json::to_string(&run.state)
        .map_err(|e| Error::Internal(format!("Failed to serialize state: {}", e)))?;
    let outcome = run
        .outcome
        .map(|o| serde_json::to_string(&o))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize outcome: {}", e)))?;
    let started_at = run.started_at.to_rfc3339();
    let ended_at = run.ended_at.map(|dt| dt.to_rfc3339());

    sqlx::query(
        r#"
        INSERT INTO sync_runs (run_id, kind, state, outcome, rows, error, started_at, ended_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(run_id) DO UPDATE SET
            state = excluded.state,
            outcome = excluded.outcome,
            rows = excluded.rows,
            error = excluded.error,
            ended_at = excluded.ended_at
        "#,
    )
    .bind(&run_id)
    .bind(&kind)
    .bind(&state)
    .bind(&outcome)
    .bind(run.rows as i64)
    .bind(&run.error)
    .bind(&started_at)
    .bind(&ended_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one sync run by id
pub async fn load_run(pool: &SqlitePool, run_id: Uuid) -> Result<Option<SyncRun>> {
    let row = sqlx::query(
        "SELECT run_id, kind, state, outcome, rows, error, started_at, ended_at \
         FROM sync_runs WHERE run_id = ?",
    )
    .bind(run_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(parse_run).transpose()
}

/// Most recently started run, if any
pub async fn latest_run(pool: &SqlitePool) -> Result<Option<SyncRun>> {
    let row = sqlx::query(
        "SELECT run_id, kind, state, outcome, rows, error, started_at, ended_at \
         FROM sync_runs ORDER BY started_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    row.map(parse_run).transpose()
}

/// True while any run is still in the Running state
pub async fn has_running_run(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sync_runs WHERE state = ?",
    )
    .bind(serde_json::to_string(&RunState::Running).map_err(|e| Error::Internal(e.to_string()))?)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

fn parse_run(row: sqlx::sqlite::SqliteRow) -> Result<SyncRun> {
    let run_id: String = row.get("run_id");
    let run_id = Uuid::parse_str(&run_id)
        .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?;

    let kind: String = row.get("kind");
    let kind: RunKind = serde_json::from_str(&kind)
        .map_err(|e| Error::Internal(format!("Failed to deserialize kind: {}", e)))?;

    let state: String = row.get("state");
    let state: RunState = serde_json::from_str(&state)
        .map_err(|e| Error::Internal(format!("Failed to deserialize state: {}", e)))?;

    let outcome: Option<String> = row.get("outcome");
    let outcome: Option<SyncStatus> = outcome
        .map(|o| serde_json::from_str(&o))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize outcome: {}", e)))?;

    let rows: i64 = row.get("rows");

    let started_at: String = row.get("started_at");
    let started_at = chrono::DateTime::parse_from_rfc3339(&started_at)
        .map_err(|e| Error::Internal(format!("Failed to parse started_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    let ended_at: Option<String> = row.get("ended_at");
    let ended_at = ended_at
        .map(|s| {
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| Error::Internal(format!("Failed to parse ended_at: {}", e)))
        })
        .transpose()?;

    Ok(SyncRun {
        run_id,
        kind,
        state,
        outcome,
        rows: rows as u64,
        error: row.get("error"),
        started_at,
        ended_at,
    })
}
