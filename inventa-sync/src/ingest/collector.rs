//! Sheet-level aggregation
//!
//! Walks every worksheet of the source in document order, normalizing each
//! row. A worksheet that fails to read is logged and skipped so one bad
//! sheet never aborts the whole pull; a worksheet with no data rows is
//! skipped outright.

use inventa_common::config::MappingConfig;
use inventa_common::models::InventoryRecord;
use inventa_common::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::sheets::SheetSource;

use super::normalize_row;

/// Bookkeeping counters for one collection pass
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectStats {
    /// Worksheets reported by the source
    pub sheets_seen: usize,
    /// Worksheets with no data rows (header only, or empty)
    pub sheets_empty: usize,
    /// Worksheets whose read failed and was skipped
    pub sheets_failed: usize,
    /// Data rows visited
    pub rows_seen: usize,
    /// Rows rejected for lacking a usable tag
    pub rows_rejected: usize,
}

/// Collect and normalize every row of every worksheet.
///
/// Fails only when the sheet list itself cannot be fetched (the source is
/// unreachable) or when the run is cancelled; per-sheet read errors are
/// absorbed into the stats. Output preserves sheet order, then row order.
pub async fn collect_all<S: SheetSource + ?Sized>(
    source: &S,
    mapping: &MappingConfig,
    cancel: &CancellationToken,
) -> Result<(Vec<InventoryRecord>, CollectStats)> {
    let titles = source.list_sheets().await?;

    let mut records = Vec::new();
    let mut stats = CollectStats {
        sheets_seen: titles.len(),
        ..Default::default()
    };

    for title in titles {
        if cancel.is_cancelled() {
            return Err(Error::Internal("sync run cancelled".to_string()));
        }

        let sheet = match source.read_rows(&title).await {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!(sheet = %title, error = %e, "Failed to read worksheet, skipping");
                stats.sheets_failed += 1;
                continue;
            }
        };

        if sheet.rows.is_empty() {
            info!(sheet = %title, "Worksheet has no data rows, skipping");
            stats.sheets_empty += 1;
            continue;
        }

        let before = records.len();
        for row in &sheet.rows {
            stats.rows_seen += 1;
            match normalize_row(&sheet.headers, row, &sheet.title, mapping) {
                Some(record) => records.push(record),
                None => stats.rows_rejected += 1,
            }
        }

        info!(
            sheet = %title,
            rows = sheet.rows.len(),
            records = records.len() - before,
            "Worksheet processed"
        );
    }

    info!(
        sheets = stats.sheets_seen,
        failed = stats.sheets_failed,
        records = records.len(),
        rejected = stats.rows_rejected,
        "Collection finished"
    );

    Ok((records, stats))
}
