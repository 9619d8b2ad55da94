//! Client-side free-text filtering

use super::cell::field_text;
use serde_json::Value;

/// Normalised form of a query: trimmed and lowercased
fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Does any search key of `row` contain the (already normalised) needle?
fn row_matches(row: &Value, keys: &[String], needle: &str) -> bool {
    needle.is_empty()
        || keys
            .iter()
            .any(|k| field_text(row, k).to_lowercase().contains(needle))
}

/// Indices of the rows matching `query`, in list order
pub fn filter_rows(rows: &[Value], keys: &[String], query: &str) -> Vec<usize> {
    let needle = normalize_query(query);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, keys, &needle))
        .map(|(i, _)| i)
        .collect()
}
