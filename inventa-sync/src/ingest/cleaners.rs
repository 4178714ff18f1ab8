//! Field-cleaning helpers for the ingest pipeline
//!
//! The source spreadsheet is hand-maintained: placeholder strings stand in
//! for empty cells, monetary values carry currency text and grouping
//! characters, and the owner lives in whichever of several columns someone
//! happened to fill in. These helpers are total - they never fail, they
//! produce a usable default instead.

/// True when the trimmed, uppercased value is one of the configured
/// "no value" placeholders (`""`, `NA`, `N/A`, `.`, `NAN` by default)
pub fn is_empty_sentinel(value: &str, sentinels: &[String]) -> bool {
    let cleaned = value.trim().to_uppercase();
    sentinels.iter().any(|s| s.to_uppercase() == cleaned)
}

/// Parse a free-text monetary cell into a float.
///
/// Commas are removed entirely (grouping characters, never decimal
/// separators in the source data), then every character that is not a
/// digit or period is stripped, then the remainder is float-parsed.
/// Empty remainder or parse failure yields `0.0`.
pub fn parse_monetary(text: &str) -> f64 {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if stripped.is_empty() {
        return 0.0;
    }

    stripped.parse::<f64>().unwrap_or(0.0)
}

/// Resolve the owner field for one row.
///
/// Candidate columns are tried in priority order; the first one holding a
/// non-empty trimmed value outside the blocklist wins. Failing that, the
/// uppercased concatenation of every cell is scanned for any whitespace
/// token of a known owner name (hand-entered rows often bury the name in
/// an unrelated column). Failing that too, the configured unassigned
/// label is returned. Always returns a non-empty string.
pub fn resolve_owner(
    headers: &[String],
    cells: &[String],
    candidates: &[String],
    blocklist: &[String],
    known_names: &[String],
    unassigned: &str,
) -> String {
    for candidate in candidates {
        // Last occurrence wins, matching the header-map construction
        let Some(idx) = headers.iter().rposition(|h| h == candidate) else {
            continue;
        };
        let Some(value) = cells.get(idx) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if blocklist.iter().any(|b| b == value) {
            continue;
        }
        return value.to_string();
    }

    let row_text = cells.join(" ").to_uppercase();
    for name in known_names {
        let matches = name
            .to_uppercase()
            .split_whitespace()
            .any(|part| row_text.contains(part));
        if matches {
            return name.clone();
        }
    }

    unassigned.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinels() -> Vec<String> {
        ["", "NA", "N/A", ".", "NAN"].iter().map(|s| s.to_string()).collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sentinel_detection_is_case_insensitive() {
        let s = sentinels();
        assert!(is_empty_sentinel("", &s));
        assert!(is_empty_sentinel("  ", &s));
        assert!(is_empty_sentinel("na", &s));
        assert!(is_empty_sentinel("n/a", &s));
        assert!(is_empty_sentinel(" NaN ", &s));
        assert!(is_empty_sentinel(".", &s));
        assert!(!is_empty_sentinel("Dell", &s));
        assert!(!is_empty_sentinel("0", &s));
    }

    #[test]
    fn parse_monetary_is_total() {
        assert_eq!(parse_monetary(""), 0.0);
        assert_eq!(parse_monetary("N/A"), 0.0);
        assert_eq!(parse_monetary("sin valor"), 0.0);
        assert_eq!(parse_monetary("$ 899.99"), 899.99);
        assert_eq!(parse_monetary("899.99 USD"), 899.99);
        // Commas are grouping characters and vanish before parsing
        assert_eq!(parse_monetary("1,234.56 COP"), 1234.56);
        // Decimal-comma input parses as its digit string (known source quirk)
        assert_eq!(parse_monetary("1.234,56 COP"), 1.23456);
        assert_eq!(parse_monetary("1.2.3"), 0.0);
        assert_eq!(parse_monetary("12,000"), 12000.0);
    }

    #[test]
    fn owner_from_first_qualifying_candidate() {
        let headers = strings(&["Placa", "Centro/R", "Responsable"]);
        let cells = strings(&["A001", "76,922710", "MANTILLA ARENAS WILLIAM"]);
        let owner = resolve_owner(
            &headers,
            &cells,
            &strings(&["Centro/R", "Responsable"]),
            &strings(&["76,922710", "76.922710", "", "NA"]),
            &[],
            "Sin asignar",
        );
        // Centro/R holds a blocklisted artifact, so Responsable wins
        assert_eq!(owner, "MANTILLA ARENAS WILLIAM");
    }

    #[test]
    fn owner_fallback_scans_row_text_for_known_names() {
        let headers = strings(&["Placa", "Observaciones"]);
        let cells = strings(&["A001", "entregado a alvarez diaz en bodega"]);
        let owner = resolve_owner(
            &headers,
            &cells,
            &strings(&["Responsable"]),
            &[],
            &strings(&["ALVAREZ DIAZ JUAN GONZALO"]),
            "Sin asignar",
        );
        assert_eq!(owner, "ALVAREZ DIAZ JUAN GONZALO");
    }

    #[test]
    fn owner_defaults_to_unassigned() {
        let headers = strings(&["Placa"]);
        let cells = strings(&["A001"]);
        let owner = resolve_owner(&headers, &cells, &[], &[], &[], "Sin asignar");
        assert_eq!(owner, "Sin asignar");
    }
}
