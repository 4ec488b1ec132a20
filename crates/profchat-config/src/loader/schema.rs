//! Structural checks for a single JSON5 config layer.
//!
//! Serde would silently ignore misspelled keys, so every layer is walked
//! against the known sections before merging. `null` is accepted for any
//! leaf because it resets the key to its default during merge.

use crate::ConfigError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
enum Kind {
    String,
    Integer,
    Number,
    Bool,
}

type Section = (&'static str, &'static [(&'static str, Kind)]);

const SECTIONS: &[Section] = &[
    ("server", &[("bind", Kind::String)]),
    (
        "retrieval",
        &[
            ("top_k", Kind::Integer),
            ("index_name", Kind::String),
            ("index_host", Kind::String),
            ("namespace", Kind::String),
            ("min_score", Kind::Number),
            ("dedupe_by_id", Kind::Bool),
        ],
    ),
    (
        "models",
        &[("embedding", Kind::String), ("chat", Kind::String)],
    ),
    ("prompt", &[("system_prompt", Kind::String)]),
    ("client", &[("server_url", Kind::String)]),
];

/// Validate a single config layer against the known sections.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let root = expect_object(value, layer, "")?;
    for (key, value) in root {
        if key == "$schema" {
            check_leaf(value, Kind::String, layer, key)?;
            continue;
        }
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| name == key) else {
            return Err(invalid_field(layer, key, "unknown key"));
        };
        if value.is_null() {
            continue;
        }
        validate_section(expect_object(value, layer, key)?, fields, layer, key)?;
    }
    Ok(())
}

fn validate_section(
    map: &Map<String, Value>,
    fields: &[(&str, Kind)],
    layer: &str,
    section: &str,
) -> Result<(), ConfigError> {
    for (key, value) in map {
        let path = format!("{section}.{key}");
        let Some((_, kind)) = fields.iter().find(|(name, _)| name == key) else {
            return Err(invalid_field(layer, &path, "unknown key"));
        };
        check_leaf(value, *kind, layer, &path)?;
    }
    Ok(())
}

fn check_leaf(value: &Value, kind: Kind, layer: &str, path: &str) -> Result<(), ConfigError> {
    let ok = match kind {
        _ if value.is_null() => true,
        Kind::String => value.is_string(),
        Kind::Integer => value.is_u64(),
        Kind::Number => value.is_number(),
        Kind::Bool => value.is_boolean(),
    };
    if ok {
        return Ok(());
    }
    let expected = match kind {
        Kind::String => "expected string",
        Kind::Integer => "expected non-negative integer",
        Kind::Number => "expected number",
        Kind::Bool => "expected bool",
    };
    Err(invalid_field(layer, path, expected))
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| invalid_field(layer, path, "expected object"))
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
