//! Shared test helpers: an in-memory sheet service

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use inventa_common::models::SheetRows;
use inventa_common::{Error, Result};
use inventa_sync::sheets::{SheetDestination, SheetSource};

/// In-memory stand-in for the Google Sheets client.
///
/// Serves configured worksheets on the read side and captures overwrites
/// on the write side. Individual sheets (or the whole source) can be made
/// to fail to exercise the partial-failure paths.
#[derive(Default)]
pub struct FakeSheets {
    /// Worksheets served to `list_sheets` / `read_rows`, in order
    pub sheets: Mutex<Vec<SheetRows>>,
    /// Worksheet titles whose read fails
    pub failing_sheets: HashSet<String>,
    /// When true, `list_sheets` fails as if the source were unreachable
    pub unavailable: bool,
    /// Last overwrite captured from push: (title, rows)
    pub written: Mutex<Option<(String, Vec<Vec<String>>)>>,
}

impl FakeSheets {
    pub fn with_sheets(sheets: Vec<SheetRows>) -> Self {
        Self {
            sheets: Mutex::new(sheets),
            ..Default::default()
        }
    }

    pub fn sheet(title: &str, headers: &[&str], rows: &[&[&str]]) -> SheetRows {
        SheetRows {
            title: title.to_string(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }
}

#[async_trait]
impl SheetSource for FakeSheets {
    async fn list_sheets(&self) -> Result<Vec<String>> {
        if self.unavailable {
            return Err(Error::SourceUnavailable("connection refused".to_string()));
        }
        Ok(self
            .sheets
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.title.clone())
            .collect())
    }

    async fn read_rows(&self, title: &str) -> Result<SheetRows> {
        if self.failing_sheets.contains(title) {
            return Err(Error::SourceUnavailable(format!(
                "read failed for {}",
                title
            )));
        }
        self.sheets
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.title == title)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("sheet {}", title)))
    }
}

#[async_trait]
impl SheetDestination for FakeSheets {
    async fn overwrite(&self, title: &str, rows: Vec<Vec<String>>) -> Result<()> {
        *self.written.lock().unwrap() = Some((title.to_string(), rows));
        Ok(())
    }
}
