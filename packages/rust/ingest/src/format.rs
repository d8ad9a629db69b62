//! Row → free-text document.

use kbagent_shared::{FormattedDocument, Row};

/// Render a row as `k1: v1 k2: v2 ... kn: vn` in column order.
///
/// Values are not escaped; the output is prompt text, never parsed back.
pub fn format_row(row: &Row) -> FormattedDocument {
    row.iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format every row, one document per row, preserving order.
pub fn format_rows(rows: &[Row]) -> Vec<FormattedDocument> {
    rows.iter().map(format_row).collect()
}
