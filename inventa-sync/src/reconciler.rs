//! Pull/push reconciliation
//!
//! Each direction is a full overwrite, never a merge:
//! - pull: fetch → normalize → full-replace write into SQLite
//! - push: read local set → serialize → fully overwrite the worksheet
//!
//! A pull that cannot reach the source, or that yields zero records,
//! finishes `Degraded` and leaves the local store untouched. Only a
//! destination write failure is a hard error.

use inventa_common::config::Config;
use inventa_common::db::articles;
use inventa_common::models::{InventoryRecord, SyncOutcome};
use inventa_common::{Error, Result};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ingest::collect_all;
use crate::sheets::{SheetDestination, SheetSource};

pub struct Reconciler {
    db: SqlitePool,
    config: Config,
}

impl Reconciler {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self { db, config }
    }

    /// Sheet → local store. Full replace via staging-then-swap.
    pub async fn pull<S: SheetSource + ?Sized>(
        &self,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome> {
        let (records, stats) = match collect_all(source, &self.config.mapping, cancel).await {
            Ok(collected) => collected,
            Err(Error::SourceUnavailable(reason)) => {
                warn!(%reason, "Sheet source unavailable, local store left untouched");
                return Ok(SyncOutcome::degraded(format!(
                    "source unavailable: {}",
                    reason
                )));
            }
            Err(e) => return Err(e),
        };

        if records.is_empty() {
            warn!(
                sheets = stats.sheets_seen,
                failed = stats.sheets_failed,
                "Pull produced no records, local store left untouched"
            );
            return Ok(SyncOutcome::degraded("source yielded no records"));
        }

        if cancel.is_cancelled() {
            return Err(Error::Internal("sync run cancelled".to_string()));
        }

        let rows = articles::replace_all(&self.db, &records)
            .await
            .map_err(|e| Error::DestinationWrite(e.to_string()))?;

        info!(
            rows,
            rejected = stats.rows_rejected,
            sheets_failed = stats.sheets_failed,
            "Pull complete"
        );
        Ok(SyncOutcome::ok(rows))
    }

    /// Local store → sheet. Clears (or creates) the destination worksheet
    /// and writes the full record set below a header row.
    pub async fn push<D: SheetDestination + ?Sized>(
        &self,
        destination: &D,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome> {
        let records = articles::read_all(&self.db).await?;

        if cancel.is_cancelled() {
            return Err(Error::Internal("sync run cancelled".to_string()));
        }

        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(self.push_headers());
        rows.extend(records.iter().map(|r| self.serialize_record(r)));

        destination
            .overwrite(&self.config.sheets.sheet_name, rows)
            .await?;

        info!(rows = records.len(), sheet = %self.config.sheets.sheet_name, "Push complete");
        Ok(SyncOutcome::ok(records.len() as u64))
    }

    /// Header row written by push. Uses the same column names the pull
    /// mapping reads, so a pull from the pushed sheet reproduces the
    /// record set (the owner goes under the highest-priority candidate
    /// column).
    fn push_headers(&self) -> Vec<String> {
        let m = &self.config.mapping;
        let owner_column = m
            .owner_columns
            .first()
            .cloned()
            .unwrap_or_else(|| "Responsable".to_string());
        vec![
            m.tag_column.clone(),
            m.description_column.clone(),
            m.brand_column.clone(),
            m.model_column.clone(),
            m.value_column.clone(),
            m.date_column.clone(),
            m.location_column.clone(),
            owner_column,
            m.attributes_column.clone(),
            m.notes_column.clone(),
            m.sequence_column.clone(),
            m.type_column.clone(),
        ]
    }

    fn serialize_record(&self, record: &InventoryRecord) -> Vec<String> {
        vec![
            record.placa.clone(),
            record.category.clone(),
            record.brand.clone(),
            record.model.clone(),
            record.value.to_string(),
            record.acquired_date.clone(),
            record.location.clone(),
            record.owner.clone(),
            record.description.clone(),
            record.notes.clone(),
            record.sequence.clone(),
            record.item_type.clone(),
        ]
    }
}
