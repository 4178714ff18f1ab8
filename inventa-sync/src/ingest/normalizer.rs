//! Row normalization
//!
//! Turns one raw sheet row into an `InventoryRecord`, or rejects it. A
//! rejection is a silent skip (logged at debug), never an error: one bad
//! row must not cost the batch.

use inventa_common::config::MappingConfig;
use inventa_common::models::InventoryRecord;

use super::cleaners::{is_empty_sentinel, parse_monetary, resolve_owner};

/// Tags that mark a row as unusable: blank cells, spreadsheet error
/// artifacts, and an accidentally duplicated header row (a cell holding
/// the tag column's own name)
const REJECTED_TAGS: [&str; 4] = ["", "nan", "none", "null"];

/// Normalize one sheet row into a record.
///
/// `cells` may be shorter than `headers` (ragged source rows); missing
/// cells read as empty. On duplicate header names the last occurrence
/// wins, matching the legacy header-map construction.
pub fn normalize_row(
    headers: &[String],
    cells: &[String],
    sheet_title: &str,
    mapping: &MappingConfig,
) -> Option<InventoryRecord> {
    // Pad ragged rows to header length
    let mut padded: Vec<String>;
    let cells = if cells.len() < headers.len() {
        padded = cells.to_vec();
        padded.resize(headers.len(), String::new());
        &padded[..]
    } else {
        cells
    };

    // Last header wins on duplicates
    let field = |name: &str| -> &str {
        headers
            .iter()
            .rposition(|h| h == name)
            .and_then(|idx| cells.get(idx))
            .map(|s| s.as_str())
            .unwrap_or("")
    };

    let placa = field(&mapping.tag_column).trim().to_string();
    let placa_lower = placa.to_lowercase();
    if REJECTED_TAGS.contains(&placa_lower.as_str())
        || placa_lower == mapping.tag_column.to_lowercase()
    {
        tracing::debug!(sheet = sheet_title, "Skipping row without usable tag");
        return None;
    }

    let description = field(&mapping.description_column).trim().to_string();
    let brand = field(&mapping.brand_column).trim().to_string();
    let model = field(&mapping.model_column).trim().to_string();

    // Display name: description plus whichever of brand/model is real data
    let mut name = description.clone();
    if !is_empty_sentinel(&brand, &mapping.empty_sentinels) {
        name.push(' ');
        name.push_str(&brand);
    }
    if !is_empty_sentinel(&model, &mapping.empty_sentinels) {
        name.push(' ');
        name.push_str(&model);
    }
    let name = name.trim().to_string();
    let name = if name.is_empty() {
        mapping.fallback_name.clone()
    } else {
        name
    };

    let category = if description.is_empty() {
        mapping.fallback_category.clone()
    } else {
        description.clone()
    };

    let value = parse_monetary(field(&mapping.value_column));

    let owner = resolve_owner(
        headers,
        cells,
        &mapping.owner_columns,
        &mapping.owner_blocklist,
        &mapping.known_owners,
        &mapping.unassigned_owner,
    );

    let attributes = field(&mapping.attributes_column).trim().to_string();
    let record_description = if attributes.is_empty() {
        description
    } else {
        attributes
    };

    let location = field(&mapping.location_column).trim().to_string();
    let location = if location.is_empty() {
        mapping.default_location.clone()
    } else {
        location
    };

    Some(InventoryRecord {
        placa,
        name,
        brand: clean_optional(&brand, &mapping.empty_sentinels),
        model: clean_optional(&model, &mapping.empty_sentinels),
        category,
        description: record_description,
        value,
        acquired_date: field(&mapping.date_column).trim().to_string(),
        location,
        owner,
        notes: field(&mapping.notes_column).trim().to_string(),
        sequence: field(&mapping.sequence_column).trim().to_string(),
        item_type: field(&mapping.type_column).trim().to_string(),
        source_sheet: sheet_title.to_string(),
    })
}

/// Sentinel values become empty strings in the stored record
fn clean_optional(value: &str, sentinels: &[String]) -> String {
    if is_empty_sentinel(value, sentinels) {
        String::new()
    } else {
        value.to_string()
    }
}
