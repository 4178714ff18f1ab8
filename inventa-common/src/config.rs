//! Configuration loading for inventa
//!
//! Priority order follows the usual multi-tier resolution: command-line
//! argument → environment variable → TOML file → compiled default. The
//! business data that the legacy system hard-coded (spreadsheet id, column
//! names, owner candidates, known owner names, sentinel strings) all live
//! here so deployments can adjust them without a rebuild.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub mapping: MappingConfig,
}

/// External spreadsheet connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier (the key in the document URL)
    #[serde(default)]
    pub sheet_id: String,

    /// Worksheet title used as the push destination
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Sheets API base URL (overridable so tests can point at a stub)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth bearer token for the Sheets API
    #[serde(default)]
    pub access_token: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Column names and normalization rules for the ingest pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Header of the asset tag column
    #[serde(default = "default_tag_column")]
    pub tag_column: String,

    /// Header of the base description column
    #[serde(default = "default_description_column")]
    pub description_column: String,

    #[serde(default = "default_brand_column")]
    pub brand_column: String,

    #[serde(default = "default_model_column")]
    pub model_column: String,

    /// Header of the monetary value column
    #[serde(default = "default_value_column")]
    pub value_column: String,

    /// Header of the free-text attributes column
    #[serde(default = "default_attributes_column")]
    pub attributes_column: String,

    #[serde(default = "default_date_column")]
    pub date_column: String,

    #[serde(default = "default_location_column")]
    pub location_column: String,

    #[serde(default = "default_notes_column")]
    pub notes_column: String,

    #[serde(default = "default_sequence_column")]
    pub sequence_column: String,

    #[serde(default = "default_type_column")]
    pub type_column: String,

    /// Candidate owner columns, highest priority first
    #[serde(default = "default_owner_columns")]
    pub owner_columns: Vec<String>,

    /// Values never accepted as an owner (includes a known numeric artifact
    /// that leaked into owner cells in the source spreadsheet)
    #[serde(default = "default_owner_blocklist")]
    pub owner_blocklist: Vec<String>,

    /// Known owner names for the fallback row-text scan
    #[serde(default)]
    pub known_owners: Vec<String>,

    /// Strings treated as "no value" (compared uppercased, trimmed)
    #[serde(default = "default_empty_sentinels")]
    pub empty_sentinels: Vec<String>,

    /// Location default when the source cell is blank
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Category label when the description is blank
    #[serde(default = "default_category")]
    pub fallback_category: String,

    /// Display name when description, brand and model are all blank
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,

    /// Owner label when no candidate or known name matches
    #[serde(default = "default_unassigned_owner")]
    pub unassigned_owner: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5780".to_string()
}

fn default_database_path() -> String {
    "inventario.db".to_string()
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_api_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tag_column() -> String {
    "Placa".to_string()
}

fn default_description_column() -> String {
    "Descripción Actual".to_string()
}

fn default_brand_column() -> String {
    "Marca".to_string()
}

fn default_model_column() -> String {
    "Modelo".to_string()
}

fn default_value_column() -> String {
    "Valor Ingreso".to_string()
}

fn default_attributes_column() -> String {
    "Atributos".to_string()
}

fn default_date_column() -> String {
    "Fecha Adquisición".to_string()
}

fn default_location_column() -> String {
    "Ubicación".to_string()
}

fn default_notes_column() -> String {
    "Observaciones".to_string()
}

fn default_sequence_column() -> String {
    "Consec.".to_string()
}

fn default_type_column() -> String {
    "Tipo".to_string()
}

fn default_owner_columns() -> Vec<String> {
    ["Centro/R", "Responsable", "Custodio", "Usuario"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_owner_blocklist() -> Vec<String> {
    ["76,922710", "76.922710", "", "NA"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_empty_sentinels() -> Vec<String> {
    ["", "NA", "N/A", ".", "NAN"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_location() -> String {
    "SENA".to_string()
}

fn default_category() -> String {
    "Sin categoría".to_string()
}

fn default_fallback_name() -> String {
    "Artículo".to_string()
}

fn default_unassigned_owner() -> String {
    "Sin asignar".to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            sheet_name: default_sheet_name(),
            api_base_url: default_api_base_url(),
            access_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            tag_column: default_tag_column(),
            description_column: default_description_column(),
            brand_column: default_brand_column(),
            model_column: default_model_column(),
            value_column: default_value_column(),
            attributes_column: default_attributes_column(),
            date_column: default_date_column(),
            location_column: default_location_column(),
            notes_column: default_notes_column(),
            sequence_column: default_sequence_column(),
            type_column: default_type_column(),
            owner_columns: default_owner_columns(),
            owner_blocklist: default_owner_blocklist(),
            known_owners: Vec::new(),
            empty_sentinels: default_empty_sentinels(),
            default_location: default_location(),
            fallback_category: default_category(),
            fallback_name: default_fallback_name(),
            unassigned_owner: default_unassigned_owner(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_path: default_database_path(),
            sheets: SheetsConfig::default(),
            mapping: MappingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used so the service can
    /// start with nothing but environment variables set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {} (using defaults)", path.display());
                Config::default()
            }
            None => Config::default(),
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables win over the TOML file
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("INVENTA_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("INVENTA_DB_PATH") {
            self.database_path = path;
        }
        if let Ok(id) = std::env::var("INVENTA_SHEET_ID") {
            self.sheets.sheet_id = id;
        }
        if let Ok(name) = std::env::var("INVENTA_SHEET_NAME") {
            self.sheets.sheet_name = name;
        }
        if let Ok(token) = std::env::var("INVENTA_SHEETS_TOKEN") {
            self.sheets.access_token = token;
        }
    }

    /// Validate the parts required for talking to the real spreadsheet.
    ///
    /// Called before a sync run, not at startup: the query-only API surface
    /// works fine without a spreadsheet configured.
    pub fn validate_sheets(&self) -> Result<()> {
        if self.sheets.sheet_id.trim().is_empty() {
            return Err(Error::Config(
                "sheet_id not configured. Set INVENTA_SHEET_ID or [sheets] sheet_id".to_string(),
            ));
        }
        Ok(())
    }
}
