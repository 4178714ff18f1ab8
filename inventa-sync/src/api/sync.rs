//! Sync job API handlers
//!
//! POST /api/sync/pull and /api/sync/push acknowledge immediately with a
//! run id and execute in the background; the outcome (including degraded
//! and failed states) is persisted and queryable afterwards. A single-slot
//! lock makes pull and push mutually exclusive: a second trigger while a
//! run is active gets 409 Conflict.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use inventa_common::db::sync_runs;
use inventa_common::models::{RunKind, RunState, SyncOutcome, SyncRun};

use crate::error::{ApiError, ApiResult};
use crate::reconciler::Reconciler;
use crate::AppState;

/// Acknowledgement returned by POST /api/sync/pull and /api/sync/push
#[derive(Debug, Serialize)]
pub struct StartSyncResponse {
    pub run_id: Uuid,
    pub kind: RunKind,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
}

/// Acknowledgement returned by POST /api/sync/cancel/:run_id
#[derive(Debug, Serialize)]
pub struct CancelSyncResponse {
    pub run_id: Uuid,
    pub cancelled: bool,
}

/// POST /api/sync/pull
///
/// Begin a pull run (sheet → local store). Returns 202 Accepted.
pub async fn start_pull(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<StartSyncResponse>)> {
    start_run(state, RunKind::Pull).await
}

/// POST /api/sync/push
///
/// Begin a push run (local store → sheet). Returns 202 Accepted.
pub async fn start_push(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<StartSyncResponse>)> {
    start_run(state, RunKind::Push).await
}

async fn start_run(
    state: AppState,
    kind: RunKind,
) -> ApiResult<(StatusCode, Json<StartSyncResponse>)> {
    state
        .config
        .validate_sheets()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // Pull and push are mutually exclusive; the guard travels into the
    // background task and releases when the run finishes
    let guard = state
        .sync_lock
        .clone()
        .try_lock_owned()
        .map_err(|_| ApiError::Conflict("Sync run already in progress".to_string()))?;

    let run = SyncRun::new(kind);
    sync_runs::save_run(&state.db, &run).await?;

    let token = CancellationToken::new();
    state
        .cancel_tokens
        .write()
        .await
        .insert(run.run_id, token.clone());

    let response = StartSyncResponse {
        run_id: run.run_id,
        kind: run.kind,
        state: run.state,
        started_at: run.started_at,
    };

    tracing::info!(run_id = %run.run_id, kind = kind.as_str(), "Sync run started");

    let state_clone = state.clone();
    tokio::spawn(async move {
        let _guard = guard;
        execute_run(state_clone, run, token).await;
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Background execution of one pull/push run
async fn execute_run(state: AppState, mut run: SyncRun, token: CancellationToken) {
    let run_id = run.run_id;
    let reconciler = Reconciler::new(state.db.clone(), (*state.config).clone());

    let result = match run.kind {
        RunKind::Pull => reconciler.pull(state.sheets.as_ref(), &token).await,
        RunKind::Push => reconciler.push(state.sheets.as_ref(), &token).await,
    };

    match result {
        Ok(outcome) => {
            tracing::info!(
                run_id = %run_id,
                status = ?outcome.status,
                rows = outcome.rows,
                "Sync run finished"
            );
            run.finish(RunState::Completed, outcome);
        }
        Err(_) if token.is_cancelled() => {
            tracing::info!(run_id = %run_id, "Sync run cancelled");
            run.finish(RunState::Cancelled, SyncOutcome::failed("cancelled by request"));
        }
        Err(e) => {
            tracing::error!(run_id = %run_id, error = %e, "Sync run failed");
            run.finish(RunState::Failed, SyncOutcome::failed(e.to_string()));
        }
    }

    if let Err(e) = sync_runs::save_run(&state.db, &run).await {
        tracing::error!(run_id = %run_id, error = %e, "Failed to persist sync run outcome");
    }

    state.cancel_tokens.write().await.remove(&run_id);
}

/// GET /api/sync/status/:run_id
pub async fn get_run_status(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> ApiResult<Json<SyncRun>> {
    let run = sync_runs::load_run(&state.db, run_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sync run not found: {}", run_id)))?;
    Ok(Json(run))
}

/// GET /api/sync/latest
pub async fn get_latest_run(State(state): State<AppState>) -> ApiResult<Json<SyncRun>> {
    let run = sync_runs::latest_run(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("No sync runs recorded".to_string()))?;
    Ok(Json(run))
}

/// POST /api/sync/cancel/:run_id
pub async fn cancel_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> ApiResult<Json<CancelSyncResponse>> {
    let run = sync_runs::load_run(&state.db, run_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sync run not found: {}", run_id)))?;

    if run.state.is_terminal() {
        return Err(ApiError::BadRequest(format!(
            "Sync run already in terminal state: {:?}",
            run.state
        )));
    }

    let tokens = state.cancel_tokens.read().await;
    let Some(token) = tokens.get(&run_id) else {
        return Err(ApiError::BadRequest(
            "Sync run is not active in this process".to_string(),
        ));
    };
    token.cancel();

    tracing::info!(run_id = %run_id, "Sync run cancellation requested");

    Ok(Json(CancelSyncResponse {
        run_id,
        cancelled: true,
    }))
}

/// Build sync job routes
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sync/pull", post(start_pull))
        .route("/api/sync/push", post(start_push))
        .route("/api/sync/status/:run_id", get(get_run_status))
        .route("/api/sync/latest", get(get_latest_run))
        .route("/api/sync/cancel/:run_id", post(cancel_run))
}
