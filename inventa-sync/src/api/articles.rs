//! Inventory query API
//!
//! Read-only endpoints over the local article store. Route paths and query
//! parameter names keep the legacy frontend contract (Spanish), response
//! bodies use the service's own models.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use inventa_common::db::articles::{self, ArticleFilter, InventoryStats};
use inventa_common::models::InventoryRecord;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, DEFAULT_PAGE_SIZE};
use crate::AppState;

/// Query parameters for GET /api/articulos
#[derive(Debug, Deserialize)]
pub struct ArticleQueryParams {
    #[serde(default)]
    pub busqueda: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub responsable: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Paginated inventory response
#[derive(Debug, Serialize)]
pub struct ArticlePageResponse {
    pub articulos: Vec<InventoryRecord>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// GET /api/articulos - paginated, filterable inventory listing
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleQueryParams>,
) -> ApiResult<Json<ArticlePageResponse>> {
    let filter = ArticleFilter {
        busqueda: params.busqueda,
        categoria: params.categoria,
        responsable: params.responsable,
    };

    let total = articles::count_filtered(&state.db, &filter).await?;
    let pagination = calculate_pagination(
        total,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let records =
        articles::query_page(&state.db, &filter, pagination.limit, pagination.offset).await?;

    Ok(Json(ArticlePageResponse {
        articulos: records,
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages,
    }))
}

/// GET /api/articulos/:placa - single article by tag
pub async fn get_article(
    State(state): State<AppState>,
    Path(placa): Path<String>,
) -> ApiResult<Json<InventoryRecord>> {
    let record = articles::find_by_placa(&state.db, &placa)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Article not found: {}", placa)))?;
    Ok(Json(record))
}

/// GET /api/inventario/estadisticas - inventory-wide aggregates
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<InventoryStats>> {
    let stats = articles::stats(&state.db).await?;
    Ok(Json(stats))
}

/// GET /api/inventario/categorias - sorted distinct categories
pub async fn get_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(articles::distinct_categories(&state.db).await?))
}

/// GET /api/inventario/responsables - sorted distinct owners
pub async fn get_owners(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(articles::distinct_owners(&state.db).await?))
}

/// Build inventory query routes
pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/api/articulos", get(list_articles))
        .route("/api/articulos/:placa", get(get_article))
        .route("/api/inventario/estadisticas", get(get_stats))
        .route("/api/inventario/categorias", get(get_categories))
        .route("/api/inventario/responsables", get(get_owners))
}
