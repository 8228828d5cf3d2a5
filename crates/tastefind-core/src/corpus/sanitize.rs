//! Tolerant parsing of scraped metadata records.
//!
//! Metadata files are written by tools that happily emit bare `NaN`,
//! `Infinity` and `-Infinity` for missing numeric cells. Those are not JSON,
//! so [`rewrite_non_finite`] replaces them with `null` before handing the text
//! to `serde_json`. Nulls are then flattened to empty strings so downstream
//! code never sees an absent field value.

use serde_json::{Map, Value};

const NON_FINITE_TOKENS: &[&str] = &["-Infinity", "Infinity", "NaN"];

/// Parses a JSON array of objects, tolerating non-finite number literals.
///
/// # Returns
///
/// One map per record, with every `null` field replaced by `""`.
pub fn parse_records(json: &str) -> Result<Vec<Map<String, Value>>, String> {
    let cleaned = rewrite_non_finite(json);
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| e.to_string())?;

    let Value::Array(items) = value else {
        return Err("expected a JSON array of records".to_string());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(fields) => Ok(blank_nulls(fields)),
            other => Err(format!(
                "record {} is not an object (found {})",
                i,
                type_name(&other)
            )),
        })
        .collect()
}

/// Replaces `NaN`, `Infinity` and `-Infinity` outside string literals with `null`.
pub fn rewrite_non_finite(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = json;

    while let Some(c) = rest.chars().next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            rest = &rest[c.len_utf8()..];
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            rest = &rest[1..];
            continue;
        }

        if let Some(token) = NON_FINITE_TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn blank_nulls(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| match value {
            Value::Null => (key, Value::String(String::new())),
            other => (key, other),
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
