//! Spreadsheet access
//!
//! The reconciler talks to the spreadsheet through the two traits below so
//! tests can substitute an in-memory implementation. The production
//! implementation is `GoogleSheetsClient` over the Sheets v4 REST API.

use async_trait::async_trait;
use inventa_common::models::SheetRows;
use inventa_common::Result;

pub mod google;

pub use google::GoogleSheetsClient;

/// Read side of the external spreadsheet
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Titles of every worksheet, in document order
    async fn list_sheets(&self) -> Result<Vec<String>>;

    /// Full contents of one worksheet (header row + data rows)
    async fn read_rows(&self, title: &str) -> Result<SheetRows>;
}

/// Write side of the external spreadsheet
#[async_trait]
pub trait SheetDestination: Send + Sync {
    /// Fully overwrite one worksheet: clear it (creating it when absent)
    /// and write the given rows starting at A1
    async fn overwrite(&self, title: &str, rows: Vec<Vec<String>>) -> Result<()>;
}

/// Combined trait for a service that can do both directions
pub trait SheetService: SheetSource + SheetDestination {}

impl<T: SheetSource + SheetDestination> SheetService for T {}
