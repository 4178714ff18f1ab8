//! Article repository
//!
//! The pull side of reconciliation replaces the whole table at once via a
//! staging table that is swapped in atomically, so readers never observe a
//! half-written inventory. The query side backs the REST surface.

use crate::models::InventoryRecord;
use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::ARTICLES_COLUMNS;

/// Full-replace write of the article set.
///
/// Staging-then-swap inside one transaction: the new set is inserted into
/// `articles_staging`, then the live table is dropped and the staging table
/// renamed into place. A failure (or cancellation) before commit leaves the
/// previous inventory intact.
pub async fn replace_all(pool: &SqlitePool, records: &[InventoryRecord]) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query("DROP TABLE IF EXISTS articles_staging")
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!(
        "CREATE TABLE articles_staging ({ARTICLES_COLUMNS})"
    ))
    .execute(&mut *tx)
    .await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO articles_staging (
                placa, name, brand, model, category, description, value,
                acquired_date, location, owner, notes, sequence, item_type,
                source_sheet
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.placa)
        .bind(&record.name)
        .bind(&record.brand)
        .bind(&record.model)
        .bind(&record.category)
        .bind(&record.description)
        .bind(record.value)
        .bind(&record.acquired_date)
        .bind(&record.location)
        .bind(&record.owner)
        .bind(&record.notes)
        .bind(&record.sequence)
        .bind(&record.item_type)
        .bind(&record.source_sheet)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DROP TABLE articles").execute(&mut *tx).await?;
    sqlx::query("ALTER TABLE articles_staging RENAME TO articles")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    // Indexes dropped with the old table; recreate on the swapped-in one
    super::create_articles_indexes(pool).await?;

    Ok(records.len() as u64)
}

/// Read the full article set in insertion (sheet, then row) order
pub async fn read_all(pool: &SqlitePool) -> Result<Vec<InventoryRecord>> {
    let records = sqlx::query_as::<_, InventoryRecord>(
        "SELECT * FROM articles ORDER BY rowid",
    )
    .fetch_all(pool)
    .await?;
    Ok(records)
}

/// Fetch one article by tag. Duplicate tags exist in source data; the
/// first inserted wins for this lookup.
pub async fn find_by_placa(pool: &SqlitePool, placa: &str) -> Result<Option<InventoryRecord>> {
    let record = sqlx::query_as::<_, InventoryRecord>(
        "SELECT * FROM articles WHERE placa = ? ORDER BY rowid LIMIT 1",
    )
    .bind(placa)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Filters for the paginated inventory query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleFilter {
    /// Free-text search over name, placa and description
    pub busqueda: Option<String>,
    /// Substring match on category
    pub categoria: Option<String>,
    /// Substring match on owner
    pub responsable: Option<String>,
}

fn push_filter_clauses<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a ArticleFilter) {
    if let Some(q) = filter.busqueda.as_deref().filter(|q| !q.trim().is_empty()) {
        let like = format!("%{}%", q.trim());
        builder
            .push(" AND (name LIKE ")
            .push_bind(like.clone())
            .push(" OR placa LIKE ")
            .push_bind(like.clone())
            .push(" OR description LIKE ")
            .push_bind(like)
            .push(")");
    }
    if let Some(cat) = filter.categoria.as_deref().filter(|c| !c.trim().is_empty()) {
        builder
            .push(" AND category LIKE ")
            .push_bind(format!("%{}%", cat.trim()));
    }
    if let Some(owner) = filter.responsable.as_deref().filter(|o| !o.trim().is_empty()) {
        builder
            .push(" AND owner LIKE ")
            .push_bind(format!("%{}%", owner.trim()));
    }
}

/// Count articles matching the filter
pub async fn count_filtered(pool: &SqlitePool, filter: &ArticleFilter) -> Result<i64> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM articles WHERE 1=1");
    push_filter_clauses(&mut builder, filter);
    let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(count)
}

/// One page of articles matching the filter, in insertion order
pub async fn query_page(
    pool: &SqlitePool,
    filter: &ArticleFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<InventoryRecord>> {
    let mut builder = QueryBuilder::new("SELECT * FROM articles WHERE 1=1");
    push_filter_clauses(&mut builder, filter);
    builder
        .push(" ORDER BY rowid LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let records = builder
        .build_query_as::<InventoryRecord>()
        .fetch_all(pool)
        .await?;
    Ok(records)
}

/// Sorted distinct category labels
pub async fn distinct_categories(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM articles ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Sorted distinct owner labels
pub async fn distinct_owners(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT owner FROM articles ORDER BY owner",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Grouped count used by the statistics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: i64,
}

/// Inventory-wide aggregates
#[derive(Debug, Clone, Serialize)]
pub struct InventoryStats {
    pub total_articles: i64,
    pub total_value: f64,
    pub total_categories: i64,
    pub total_owners: i64,
    pub top_categories: Vec<GroupCount>,
    pub top_owners: Vec<GroupCount>,
}

/// Compute inventory statistics (totals plus top-10 groupings)
pub async fn stats(pool: &SqlitePool) -> Result<InventoryStats> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(value), 0.0) AS total_value,
               COUNT(DISTINCT category) AS categories,
               COUNT(DISTINCT owner) AS owners
        FROM articles
        "#,
    )
    .fetch_one(pool)
    .await?;

    let total_articles: i64 = row.get("total");
    let total_value: f64 = row.get("total_value");
    let total_categories: i64 = row.get("categories");
    let total_owners: i64 = row.get("owners");

    let top_categories = top_grouped(pool, "category").await?;
    let top_owners = top_grouped(pool, "owner").await?;

    Ok(InventoryStats {
        total_articles,
        total_value,
        total_categories,
        total_owners,
        top_categories,
        top_owners,
    })
}

async fn top_grouped(pool: &SqlitePool, column: &str) -> Result<Vec<GroupCount>> {
    // column is a compile-time constant from stats(), never user input
    let rows = sqlx::query(&format!(
        "SELECT {column} AS label, COUNT(*) AS cnt FROM articles \
         GROUP BY {column} ORDER BY cnt DESC, label LIMIT 10"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| GroupCount {
            label: row.get("label"),
            count: row.get("cnt"),
        })
        .collect())
}
