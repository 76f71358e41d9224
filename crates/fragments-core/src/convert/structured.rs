//! Converters for the structured-data types: JSON, YAML and CSV.

use serde_json::{Map, Value};

fn parse_json(data: &[u8]) -> Result<Value, String> {
    serde_json::from_slice(data).map_err(|e| format!("malformed JSON: {e}"))
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, String> {
    serde_json::to_vec_pretty(value).map_err(|e| e.to_string())
}

/// Pretty-print JSON with two-space indentation.
pub(super) fn json_to_plain(data: &[u8]) -> Result<Vec<u8>, String> {
    to_pretty_json(&parse_json(data)?)
}

pub(super) fn json_to_yaml(data: &[u8]) -> Result<Vec<u8>, String> {
    let value = parse_json(data)?;
    serde_yaml::to_string(&value)
        .map(String::into_bytes)
        .map_err(|e| e.to_string())
}

pub(super) fn yaml_to_json(data: &[u8]) -> Result<Vec<u8>, String> {
    let value: Value = serde_yaml::from_slice(data).map_err(|e| format!("malformed YAML: {e}"))?;
    to_pretty_json(&value)
}

/// Turn CSV rows into an array of objects keyed by the header row.
///
/// Fields are comma-split and trimmed and always become strings. Short rows
/// are padded with `""`; surplus fields are dropped. Blank lines are skipped.
/// Bytes that are not UTF-8 become U+FFFD.
pub(super) fn csv_to_json(data: &[u8]) -> Result<Vec<u8>, String> {
    let text = String::from_utf8_lossy(data);
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| String::from("missing header row"))?
        .split(',')
        .map(str::trim)
        .collect();

    let rows: Vec<Map<String, Value>> = lines
        .map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            header
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let field = fields.get(i).copied().unwrap_or_default();
                    ((*name).to_owned(), Value::String(field.to_owned()))
                })
                .collect()
        })
        .collect();

    to_pretty_json(&rows)
}
