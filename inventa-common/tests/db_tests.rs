//! Repository tests over an in-memory SQLite database
//!
//! Covers full-replace semantics of the articles table, filtered queries,
//! statistics aggregates, and sync run persistence.

use inventa_common::db::{self, articles, sync_runs};
use inventa_common::models::{InventoryRecord, RunKind, RunState, SyncOutcome, SyncRun, SyncStatus};

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

#[tokio::test]
async fn replace_all_overwrites_previous_set() {
    let pool = db::init_in_memory().await.unwrap();

    let first = vec![
        record("A001", "Laptop Dell", "Computadores", "Sin asignar", 899.99),
        record("A002", "Monitor LG", "Monitores", "Sin asignar", 120.0),
    ];
    let written = articles::replace_all(&pool, &first).await.unwrap();
    assert_eq!(written, 2);

    // Second pull with a disjoint set: nothing from the first pull survives
    let second = vec![record("B001", "Impresora", "Impresoras", "Sin asignar", 300.0)];
    articles::replace_all(&pool, &second).await.unwrap();

    let all = articles::read_all(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].placa, "B001");
}

#[tokio::test]
async fn replace_all_preserves_duplicate_tags_and_order() {
    let pool = db::init_in_memory().await.unwrap();

    let mut dup = record("A001", "Laptop Dell", "Computadores", "Sin asignar", 899.99);
    dup.source_sheet = "Hoja2".to_string();
    let records = vec![
        record("A001", "Laptop Dell", "Computadores", "Sin asignar", 899.99),
        dup,
        record("A002", "Monitor LG", "Monitores", "Sin asignar", 120.0),
    ];
    articles::replace_all(&pool, &records).await.unwrap();

    let all = articles::read_all(&pool).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].source_sheet, "Hoja1");
    assert_eq!(all[1].source_sheet, "Hoja2");
    assert_eq!(all[2].placa, "A002");

    // Lookup by tag returns the first inserted
    let found = articles::find_by_placa(&pool, "A001").await.unwrap().unwrap();
    assert_eq!(found.source_sheet, "Hoja1");
}

#[tokio::test]
async fn filtered_query_and_count_agree() {
    let pool = db::init_in_memory().await.unwrap();
    let records = vec![
        record("A001", "Laptop Dell", "Computadores", "ALVAREZ DIAZ JUAN GONZALO", 899.99),
        record("A002", "Laptop HP", "Computadores", "Sin asignar", 750.0),
        record("A003", "Monitor LG", "Monitores", "Sin asignar", 120.0),
    ];
    articles::replace_all(&pool, &records).await.unwrap();

    let filter = articles::ArticleFilter {
        busqueda: Some("laptop".to_string()),
        ..Default::default()
    };
    let total = articles::count_filtered(&pool, &filter).await.unwrap();
    let page = articles::query_page(&pool, &filter, 50, 0).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(page.len(), 2);

    let filter = articles::ArticleFilter {
        responsable: Some("alvarez".to_string()),
        ..Default::default()
    };
    // LIKE is case-insensitive for ASCII in SQLite
    let total = articles::count_filtered(&pool, &filter).await.unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn stats_aggregates_value_and_groupings() {
    let pool = db::init_in_memory().await.unwrap();
    let records = vec![
        record("A001", "Laptop Dell", "Computadores", "Sin asignar", 100.0),
        record("A002", "Laptop HP", "Computadores", "Sin asignar", 200.0),
        record("A003", "Monitor LG", "Monitores", "MANTILLA ARENAS WILLIAM", 50.0),
    ];
    articles::replace_all(&pool, &records).await.unwrap();

    let stats = articles::stats(&pool).await.unwrap();
    assert_eq!(stats.total_articles, 3);
    assert!((stats.total_value - 350.0).abs() < f64::EPSILON);
    assert_eq!(stats.total_categories, 2);
    assert_eq!(stats.total_owners, 2);
    assert_eq!(stats.top_categories[0].label, "Computadores");
    assert_eq!(stats.top_categories[0].count, 2);

    let categories = articles::distinct_categories(&pool).await.unwrap();
    assert_eq!(categories, vec!["Computadores", "Monitores"]);
}

#[tokio::test]
async fn init_database_creates_file_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("inventario.db");

    let pool = db::init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    // Schema is usable immediately after init
    let all = articles::read_all(&pool).await.unwrap();
    assert!(all.is_empty());

    // Re-init on an existing file is idempotent
    drop(pool);
    let pool = db::init_database(&db_path).await.unwrap();
    articles::replace_all(&pool, &[record("A001", "X", "C", "O", 1.0)])
        .await
        .unwrap();
}

#[tokio::test]
async fn sync_run_round_trip() {
    let pool = db::init_in_memory().await.unwrap();

    let mut run = SyncRun::new(RunKind::Pull);
    sync_runs::save_run(&pool, &run).await.unwrap();
    assert!(sync_runs::has_running_run(&pool).await.unwrap());

    run.finish(RunState::Completed, SyncOutcome::ok(17));
    sync_runs::save_run(&pool, &run).await.unwrap();

    let loaded = sync_runs::load_run(&pool, run.run_id).await.unwrap().unwrap();
    assert_eq!(loaded.state, RunState::Completed);
    assert_eq!(loaded.outcome, Some(SyncStatus::Ok));
    assert_eq!(loaded.rows, 17);
    assert!(!sync_runs::has_running_run(&pool).await.unwrap());

    let latest = sync_runs::latest_run(&pool).await.unwrap().unwrap();
    assert_eq!(latest.run_id, run.run_id);
}
