//! Integration tests for the HTTP API
//!
//! Router driven with `tower::util::ServiceExt::oneshot` over an
//! in-memory database and the fake sheet service.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::FakeSheets;
use inventa_common::config::Config;
use inventa_common::db::{self, articles};
use inventa_common::models::InventoryRecord;
use inventa_sync::{build_router, AppState};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

const HEADERS: &[&str] = &[
    "Placa",
    "Descripción Actual",
    "Marca",
    "Modelo",
    "Valor Ingreso",
    "Responsable",
];

/// Test helper: state over an in-memory database and the given fake
async fn setup_state(fake: FakeSheets) -> AppState {
    let pool = db::init_in_memory().await.unwrap();
    let mut config = Config::default();
    config.sheets.sheet_id = "test-sheet".to_string();
    AppState::new(pool, config, Arc::new(fake))
}

fn record(placa: &str, name: &str, category: &str, owner: &str, value: f64) -> InventoryRecord {
    InventoryRecord {
        placa: placa.to_string(),
        name: name.to_string(),
        brand: String::new(),
        model: String::new(),
        category: category.to_string(),
        description: name.to_string(),
        value,
        acquired_date: String::new(),
        location: "SENA".to_string(),
        owner: owner.to_string(),
        notes: String::new(),
        sequence: String::new(),
        item_type: String::new(),
        source_sheet: "Hoja1".to_string(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let state = setup_state(FakeSheets::default()).await;
    let app = build_router(state);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "inventa-sync");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn article_listing_filters_and_paginates() {
    let state = setup_state(FakeSheets::default()).await;
    articles::replace_all(
        &state.db,
        &[
            record("A001", "Laptop Dell", "Computadores", "PEREZ JUAN", 899.99),
            record("A002", "Laptop HP", "Computadores", "Sin asignar", 750.0),
            record("A003", "Monitor LG", "Monitores", "Sin asignar", 120.0),
        ],
    )
    .await
    .unwrap();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(get("/api/articulos?busqueda=laptop&page=1&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["articulos"].as_array().unwrap().len(), 1);
    assert_eq!(body["articulos"][0]["placa"], "A001");

    let response = app
        .clone()
        .oneshot(get("/api/articulos/A003"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Monitor LG");

    let response = app.oneshot(get("/api/articulos/ZZZ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_and_distinct_endpoints() {
    let state = setup_state(FakeSheets::default()).await;
    articles::replace_all(
        &state.db,
        &[
            record("A001", "Laptop Dell", "Computadores", "PEREZ JUAN", 100.0),
            record("A002", "Laptop HP", "Computadores", "Sin asignar", 200.0),
        ],
    )
    .await
    .unwrap();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(get("/api/inventario/estadisticas"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_articles"], 2);
    assert_eq!(body["total_value"], 300.0);
    assert_eq!(body["top_categories"][0]["label"], "Computadores");

    let response = app
        .clone()
        .oneshot(get("/api/inventario/categorias"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, serde_json::json!(["Computadores"]));

    let response = app
        .oneshot(get("/api/inventario/responsables"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, serde_json::json!(["PEREZ JUAN", "Sin asignar"]));
}

#[tokio::test]
async fn pull_endpoint_acknowledges_and_completes() {
    let fake = FakeSheets::with_sheets(vec![FakeSheets::sheet(
        "Hoja1",
        HEADERS,
        &[&["A001", "Laptop", "Dell", "XPS", "899.99", "PEREZ JUAN"]],
    )]);
    let state = setup_state(fake).await;
    let app = build_router(state.clone());

    let response = app.clone().oneshot(post("/api/sync/pull")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = extract_json(response.into_body()).await;
    let run_id = body["run_id"].as_str().unwrap().to_string();
    assert_eq!(body["kind"], "pull");
    assert_eq!(body["state"], "running");

    // Poll status until the background run reaches a terminal state
    let mut last = Value::Null;
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/sync/status/{}", run_id)))
            .await
            .unwrap();
        last = extract_json(response.into_body()).await;
        if last["state"] != "running" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["state"], "completed");
    assert_eq!(last["outcome"], "ok");
    assert_eq!(last["rows"], 1);

    // The pulled record is visible through the query API
    let response = app.oneshot(get("/api/articulos")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["articulos"][0]["placa"], "A001");
}

#[tokio::test]
async fn unreachable_source_reports_degraded_run() {
    let fake = FakeSheets {
        unavailable: true,
        ..Default::default()
    };
    let state = setup_state(fake).await;
    let app = build_router(state);

    let response = app.clone().oneshot(post("/api/sync/pull")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = extract_json(response.into_body()).await;
    let run_id = body["run_id"].as_str().unwrap().to_string();

    let mut last = Value::Null;
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/sync/status/{}", run_id)))
            .await
            .unwrap();
        last = extract_json(response.into_body()).await;
        if last["state"] != "running" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["state"], "completed");
    assert_eq!(last["outcome"], "degraded");
    assert_eq!(last["rows"], 0);
}

#[tokio::test]
async fn concurrent_sync_gets_conflict() {
    let state = setup_state(FakeSheets::default()).await;
    let app = build_router(state.clone());

    // Hold the single-slot lock as if a run were active
    let _guard = state.sync_lock.clone().try_lock_owned().unwrap();

    let response = app.clone().oneshot(post("/api/sync/pull")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(post("/api/sync/push")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn sync_requires_configured_sheet_id() {
    let pool = db::init_in_memory().await.unwrap();
    // Default config has no sheet_id
    let state = AppState::new(pool, Config::default(), Arc::new(FakeSheets::default()));
    let app = build_router(state);

    let response = app.oneshot(post("/api/sync/pull")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_run_id_is_not_found() {
    let state = setup_state(FakeSheets::default()).await;
    let app = build_router(state);

    let response = app
        .oneshot(get("/api/sync/status/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
