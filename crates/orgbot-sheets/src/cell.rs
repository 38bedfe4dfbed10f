//! Tolerant extraction of spreadsheet cell values.
//!
//! Feishu returns range values as loosely typed JSON: a cell may be a
//! plain string, a number, a rich-text segment object carrying a `text`
//! field, or an array of such segments. Extraction always yields a plain
//! string.

use serde_json::Value;

/// Extract the text content of a cell.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map
            .get("text")
            .map(|t| cell_text(t))
            .unwrap_or_default(),
        Value::Array(segments) => segments
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

/// Extract an integer from a cell, tolerating numeric strings.
pub fn cell_i64(cell: &Value) -> Option<i64> {
    match cell {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => cell_text(cell).parse().ok(),
    }
}
