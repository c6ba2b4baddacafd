//! Normalization of heterogeneous source content into `RawRow` sequences.
//!
//! Supported formats: TSV, CSV, a JSON object or array of objects, and
//! JSON-lines. All values are normalized to strings; JSON nulls become
//! empty strings and are treated as missing downstream.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use populate_model::RawRow;

use crate::error::{FormatError, IngestError};
use crate::table::{RawTable, parse_delimited};

/// Convert a parsed table into column-name keyed rows.
pub fn table_to_rows(table: &RawTable) -> Vec<RawRow> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
        .collect()
}

/// Parse source file content into rows, dispatching on the filename.
///
/// Unknown extensions fall back to content inspection: JSON when the text
/// starts with an object or array, delimited text otherwise.
pub fn parse_source_content(content: &str, filename: &str) -> Result<Vec<RawRow>, FormatError> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".json") || lower.ends_with(".jsonl") || lower.ends_with(".ndjson") {
        return parse_json_rows(content);
    }
    if lower.ends_with(".tsv") {
        return Ok(table_to_rows(&parse_delimited(content, b'\t')?));
    }
    if lower.ends_with(".csv") {
        return Ok(table_to_rows(&parse_delimited(content, b',')?));
    }
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        debug!(filename, "unknown extension, parsing as json");
        return parse_json_rows(content);
    }
    debug!(filename, "unknown extension, parsing as delimited text");
    Ok(table_to_rows(&parse_delimited(
        content,
        sniff_delimiter(content),
    )?))
}

/// Load rows from a local file.
pub fn read_local_rows(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    Ok(parse_source_content(&content, filename)?)
}

/// Parse JSON content: a single object, an array of objects, or JSON-lines.
pub fn parse_json_rows(content: &str) -> Result<Vec<RawRow>, FormatError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => json_value_to_rows(value),
        Err(_) => {
            // One object per line.
            let mut rows = Vec::new();
            for line in trimmed.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(line)?;
                rows.push(object_to_row(value)?);
            }
            Ok(rows)
        }
    }
}

fn json_value_to_rows(value: Value) -> Result<Vec<RawRow>, FormatError> {
    match value {
        Value::Object(_) => Ok(vec![object_to_row(value)?]),
        Value::Array(items) => items.into_iter().map(object_to_row).collect(),
        _ => Err(FormatError::Message(
            "expected a JSON object or array of objects".to_string(),
        )),
    }
}

fn object_to_row(value: Value) -> Result<RawRow, FormatError> {
    let Value::Object(map) = value else {
        return Err(FormatError::Message(
            "expected a JSON object row".to_string(),
        ));
    };
    let mut row = RawRow::new();
    for (column, value) in map {
        row.insert(column, value_to_cell(&value));
    }
    Ok(row)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn sniff_delimiter(content: &str) -> u8 {
    let first = content.lines().next().unwrap_or("");
    if first.contains('\t') { b'\t' } else { b',' }
}
