//! Google Sheets v4 REST client
//!
//! Thin client over the spreadsheet endpoints the reconciler needs:
//! listing worksheets, reading a worksheet's values, and the
//! clear / add-sheet / update sequence used by push. Authentication is a
//! bearer token supplied through configuration; token acquisition is out
//! of scope here.

use inventa_common::config::SheetsConfig;
use inventa_common::models::SheetRows;
use inventa_common::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{SheetDestination, SheetSource};

const USER_AGENT: &str = concat!("inventa/", env!("CARGO_PKG_VERSION"));

/// Rows requested per worksheet read; the source never approaches this
const READ_RANGE: &str = "A1:ZZ100000";

/// Grid size for a newly created push destination
const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLS: u32 = 26;

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Client for one spreadsheet
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    access_token: String,
}

impl GoogleSheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sheet_id: config.sheet_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// URL for `/spreadsheets/{id}` plus extra path segments, with proper
    /// percent-encoding of worksheet titles
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid Sheets API base URL: {}", e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config("Sheets API base URL cannot be a base".to_string()))?;
            path.extend(["spreadsheets", self.sheet_id.as_str()]);
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SourceUnavailable(format!(
                "Sheets API returned {}: {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Sheets API response parse: {}", e)))
    }

    async fn post_json(&self, url: Url, body: serde_json::Value) -> Result<()> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::DestinationWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DestinationWrite(format!(
                "Sheets API returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn list_sheets(&self) -> Result<Vec<String>> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let spreadsheet: SpreadsheetResponse = self.get_json(url).await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn read_rows(&self, title: &str) -> Result<SheetRows> {
        let range = format!("{}!{}", title, READ_RANGE);
        let mut url = self.url(&["values", &range])?;
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");

        let values: ValuesResponse = self.get_json(url).await?;
        let mut rows = values.values;
        let headers = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };

        Ok(SheetRows {
            title: title.to_string(),
            headers,
            rows,
        })
    }
}

#[async_trait::async_trait]
impl SheetDestination for GoogleSheetsClient {
    async fn overwrite(&self, title: &str, rows: Vec<Vec<String>>) -> Result<()> {
        // Existing worksheet is cleared; a missing one is created
        let existing = self
            .list_sheets()
            .await
            .map_err(|e| Error::DestinationWrite(e.to_string()))?;

        if existing.iter().any(|t| t == title) {
            let clear = format!("{}:clear", title);
            let url = self.url(&["values", &clear])?;
            self.post_json(url, json!({})).await?;
        } else {
            // batchUpdate is a suffix on the spreadsheet path, not a segment
            let mut url = self.url(&[])?;
            let path = format!("{}:batchUpdate", url.path());
            url.set_path(&path);
            self.post_json(
                url,
                json!({
                    "requests": [{
                        "addSheet": {
                            "properties": {
                                "title": title,
                                "gridProperties": {
                                    "rowCount": NEW_SHEET_ROWS,
                                    "columnCount": NEW_SHEET_COLS,
                                }
                            }
                        }
                    }]
                }),
            )
            .await?;
        }

        let range = format!("{}!A1", title);
        let mut url = self.url(&["values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });

        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::DestinationWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::DestinationWrite(format!(
                "Sheets API returned {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}
