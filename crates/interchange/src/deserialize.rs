//! Deserialization of metadata and big-map records from JSON.
//!
//! The entry points are [`parse_contract_metadata`] and
//! [`parse_big_map_diffs`]. Micheline trees themselves are parsed by
//! [`Micheline::from_json`].

use crate::micheline::Micheline;
use crate::types::*;
use std::collections::BTreeMap;
use std::fmt;

/// Errors during interchange JSON deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterchangeError {
    /// A required field is missing.
    MissingField { field: String },
    /// A Micheline node is structurally invalid. `at` is a JSON-path-like location.
    InvalidNode { at: String, message: String },
    /// A record is structurally invalid.
    InvalidRecord(String),
}

impl fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterchangeError::MissingField { field } => {
                write!(f, "missing required field: '{}'", field)
            }
            InterchangeError::InvalidNode { at, message } => {
                write!(f, "invalid micheline at {}: {}", at, message)
            }
            InterchangeError::InvalidRecord(msg) => write!(f, "invalid record: {}", msg),
        }
    }
}

impl std::error::Error for InterchangeError {}

/// Parse contract metadata.
///
/// ```json
/// {"address": "KT1...", "network": "mainnet",
///  "scripts": {"babylon": {"parameter": {...}, "storage": {...}}}}
/// ```
pub fn parse_contract_metadata(
    obj: &serde_json::Value,
) -> Result<ContractMetadata, InterchangeError> {
    let address = required_str(obj, "address")?;
    let network = optional_str(obj, "network");

    let scripts_obj = obj
        .get("scripts")
        .and_then(|s| s.as_object())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "scripts".to_string(),
        })?;

    let mut scripts = BTreeMap::new();
    for (symlink, script) in scripts_obj {
        let parameter = script
            .get("parameter")
            .ok_or_else(|| InterchangeError::MissingField {
                field: format!("scripts.{}.parameter", symlink),
            })
            .and_then(Micheline::from_json)?;
        let storage = script
            .get("storage")
            .ok_or_else(|| InterchangeError::MissingField {
                field: format!("scripts.{}.storage", symlink),
            })
            .and_then(Micheline::from_json)?;
        scripts.insert(symlink.clone(), ScriptTypes { parameter, storage });
    }

    Ok(ContractMetadata {
        address,
        network,
        scripts,
    })
}

/// Parse a single big-map diff cell. An absent or null `value` marks a removal.
pub fn parse_big_map_diff(obj: &serde_json::Value) -> Result<BigMapDiffCell, InterchangeError> {
    let ptr = obj
        .get("ptr")
        .and_then(|p| p.as_i64())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "ptr".to_string(),
        })?;

    let key = obj
        .get("key")
        .ok_or_else(|| InterchangeError::MissingField {
            field: "key".to_string(),
        })
        .and_then(Micheline::from_json)?;

    let value = match obj.get("value") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(Micheline::from_json(v)?),
    };

    Ok(BigMapDiffCell {
        ptr,
        key,
        key_hash: optional_str(obj, "key_hash"),
        value,
        bin_path: required_str(obj, "bin_path")?,
        address: optional_str(obj, "address"),
        network: optional_str(obj, "network"),
        protocol: optional_str(obj, "protocol"),
        level: obj.get("level").and_then(|l| l.as_i64()).unwrap_or(0),
        timestamp: optional_str(obj, "timestamp"),
    })
}

/// Parse an array of big-map diff cells.
pub fn parse_big_map_diffs(
    arr: &serde_json::Value,
) -> Result<Vec<BigMapDiffCell>, InterchangeError> {
    let items = arr
        .as_array()
        .ok_or_else(|| InterchangeError::InvalidRecord("expected an array of cells".to_string()))?;
    items.iter().map(parse_big_map_diff).collect()
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn required_str(obj: &serde_json::Value, field: &str) -> Result<String, InterchangeError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| InterchangeError::MissingField {
            field: field.to_string(),
        })
}

fn optional_str(obj: &serde_json::Value, field: &str) -> String {
    obj.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
