use std::sync::Arc;

use bcd_core::format::to_michelson_inline;
use bcd_core::{collect_strings, to_miguel, AstError, MiguelNode, Node, Prim, TypeNode};
use bcd_interchange::{
    proto_symlink, BigMapDiffCell, ContractMetadata, ALPHA_BIG_MAP_PATH, SYMLINK_ALPHA,
};
use serde::Serialize;

use crate::error::BigMapError;

/// A cell typed against its contract storage, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedCell {
    pub key: MiguelNode,
    /// `None` when the cell records a removal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<MiguelNode>,
    /// Single-line text of the key, used as its label and for lookups.
    pub key_string: String,
}

/// Storage type of `metadata` under the symlink of `protocol`.
pub fn storage_type(
    metadata: &ContractMetadata,
    protocol: &str,
) -> Result<Arc<TypeNode>, BigMapError> {
    let storage = proto_symlink(protocol)
        .and_then(|symlink| metadata.storage(symlink))
        .ok_or_else(|| BigMapError::UnknownMetadata {
            address: metadata.address.clone(),
            network: metadata.network.clone(),
            protocol: protocol.to_string(),
        })?;
    Ok(TypeNode::from_micheline(storage)?)
}

/// Type the key and value of `cell` and present them as Miguel trees.
pub fn prepare_cell(
    cell: &BigMapDiffCell,
    storage: &Arc<TypeNode>,
) -> Result<PreparedCell, BigMapError> {
    let typed = TypedCell::build(cell, storage)?;
    tracing::debug!(
        ptr = cell.ptr,
        path = typed.key.path(),
        removed = cell.is_removed(),
        "prepared big_map cell"
    );
    Ok(PreparedCell {
        key: to_miguel(&typed.key),
        value: typed.value.as_ref().map(to_miguel),
        key_string: key_string(&typed.key),
    })
}

/// Search-index text of one cell: key strings, then value strings.
pub fn cell_strings(
    cell: &BigMapDiffCell,
    storage: &Arc<TypeNode>,
) -> Result<Vec<String>, BigMapError> {
    let typed = TypedCell::build(cell, storage)?;
    let mut out = collect_strings(&typed.key);
    if let Some(value) = &typed.value {
        out.extend(collect_strings(value));
    }
    Ok(out)
}

// ── Typing helpers ──────────────────────────────────────────────────

pub(crate) struct TypedCell {
    pub key: Node,
    pub value: Option<Node>,
}

impl TypedCell {
    pub(crate) fn build(
        cell: &BigMapDiffCell,
        storage: &Arc<TypeNode>,
    ) -> Result<TypedCell, BigMapError> {
        let path = big_map_path(cell);
        big_map_at(storage, path)?;
        let key = Node::build_at(storage, &format!("{}/k", path), &cell.key)?;
        let value = match &cell.value {
            Some(v) => Some(Node::build_at(storage, &format!("{}/v", path), v)?),
            None => None,
        };
        Ok(TypedCell { key, value })
    }
}

/// Type of the big map `cell` belongs to.
pub(crate) fn cell_big_map(
    cell: &BigMapDiffCell,
    storage: &Arc<TypeNode>,
) -> Result<Arc<TypeNode>, BigMapError> {
    big_map_at(storage, big_map_path(cell))
}

/// Pre-Babylon storage keeps its only big map at a fixed path.
pub(crate) fn big_map_path(cell: &BigMapDiffCell) -> &str {
    if proto_symlink(&cell.protocol) == Some(SYMLINK_ALPHA) {
        ALPHA_BIG_MAP_PATH
    } else {
        &cell.bin_path
    }
}

pub(crate) fn big_map_at(
    storage: &Arc<TypeNode>,
    path: &str,
) -> Result<Arc<TypeNode>, BigMapError> {
    let ty = storage
        .find_by_path(path)
        .ok_or_else(|| AstError::PathNotFound {
            path: path.to_string(),
        })?;
    if ty.prim != Prim::BigMap {
        return Err(BigMapError::NotABigMap {
            path: path.to_string(),
            prim: ty.prim.to_string(),
        });
    }
    Ok(ty)
}

fn key_string(key: &Node) -> String {
    if key.is_leaf() {
        if let Some(text) = collect_strings(key).into_iter().next() {
            return text;
        }
    }
    to_michelson_inline(&key.to_micheline())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcd_core::{DiffStatus, Micheline};
    use serde_json::json;
    use std::collections::BTreeMap;

    const BABYLON: &str = "PsBabyM1eUXZseaJdmXFApDSBqj8YBfwELoxZHHW77EMcAbbwAS";
    const ATHENS: &str = "Pt24m4xiPbLDhVgVfABUjirbmda3yohdN82Sp1FeuAXJ4eV9otd";

    fn storage() -> Arc<TypeNode> {
        TypeNode::from_json(&json!({
            "prim": "pair",
            "args": [
                {"prim": "nat", "annots": ["%counter"]},
                {"prim": "big_map", "annots": ["%ledger"], "args": [
                    {"prim": "pair", "args": [{"prim": "address"}, {"prim": "nat"}]},
                    {"prim": "nat"}
                ]}
            ]
        }))
        .unwrap()
    }

    fn cell(key: serde_json::Value, value: Option<serde_json::Value>) -> BigMapDiffCell {
        BigMapDiffCell {
            ptr: 7,
            key: Micheline::from_json(&key).unwrap(),
            key_hash: String::new(),
            value: value.map(|v| Micheline::from_json(&v).unwrap()),
            bin_path: "0/1".to_string(),
            address: "KT18amZmM5W7qDWVt2pH6uj7sCEd3kbzLrHT".to_string(),
            network: "mainnet".to_string(),
            protocol: BABYLON.to_string(),
            level: 1,
            timestamp: String::new(),
        }
    }

    fn ledger_key() -> serde_json::Value {
        json!({"prim": "Pair", "args": [
            {"string": "tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx"},
            {"int": "0"}
        ]})
    }

    #[test]
    fn prepares_key_and_value() {
        let prepared = prepare_cell(&cell(ledger_key(), Some(json!({"int": "42"}))), &storage())
            .unwrap();
        assert_eq!(prepared.key.path, "0/1/k");
        assert_eq!(prepared.key.children.len(), 2);
        assert_eq!(
            prepared.key_string,
            "Pair \"tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx\" 0"
        );
        let value = prepared.value.unwrap();
        assert_eq!(value.path, "0/1/v");
        assert_eq!(value.value, Some(json!("42")));
        assert_eq!(value.status, DiffStatus::Unchanged);
    }

    #[test]
    fn removal_has_no_value() {
        let prepared = prepare_cell(&cell(ledger_key(), None), &storage()).unwrap();
        assert!(prepared.value.is_none());
        let rendered = serde_json::to_value(&prepared).unwrap();
        assert!(rendered.get("value").is_none());
    }

    #[test]
    fn leaf_keys_use_their_display_text() {
        let ty = TypeNode::from_json(&json!({
            "prim": "big_map", "args": [{"prim": "string"}, {"prim": "bytes"}]
        }))
        .unwrap();
        let mut c = cell(json!({"string": "name"}), Some(json!({"bytes": "cafe"})));
        c.bin_path = "0".to_string();
        assert_eq!(prepare_cell(&c, &ty).unwrap().key_string, "name");
    }

    #[test]
    fn alpha_protocol_forces_fixed_path() {
        let ty = TypeNode::from_json(&json!({
            "prim": "pair",
            "args": [
                {"prim": "big_map", "args": [{"prim": "string"}, {"prim": "nat"}]},
                {"prim": "unit"}
            ]
        }))
        .unwrap();
        let mut c = cell(json!({"string": "k"}), Some(json!({"int": "1"})));
        c.protocol = ATHENS.to_string();
        c.bin_path = "0".to_string();
        assert_eq!(prepare_cell(&c, &ty).unwrap().key.path, "0/0/k");
    }

    #[test]
    fn bin_path_must_address_a_big_map() {
        let mut c = cell(ledger_key(), None);
        c.bin_path = "0/0".to_string();
        assert_eq!(
            prepare_cell(&c, &storage()).unwrap_err(),
            BigMapError::NotABigMap {
                path: "0/0".to_string(),
                prim: "nat".to_string()
            }
        );
        c.bin_path = "0/9".to_string();
        assert!(matches!(
            prepare_cell(&c, &storage()).unwrap_err(),
            BigMapError::Ast(AstError::PathNotFound { .. })
        ));
    }

    #[test]
    fn mistyped_value_is_an_engine_error() {
        let err = prepare_cell(&cell(ledger_key(), Some(json!({"string": "x"}))), &storage())
            .unwrap_err();
        assert!(matches!(err, BigMapError::Ast(AstError::MalformedValue { .. })));
    }

    #[test]
    fn cell_strings_key_then_value() {
        let strings =
            cell_strings(&cell(ledger_key(), Some(json!({"int": "42"}))), &storage()).unwrap();
        assert_eq!(
            strings,
            vec!["tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx", "0", "42"]
        );
    }

    #[test]
    fn storage_type_by_symlink() {
        let mut scripts = BTreeMap::new();
        scripts.insert(
            "babylon".to_string(),
            bcd_interchange::ScriptTypes {
                parameter: Micheline::prim("unit", vec![]),
                storage: Micheline::prim("nat", vec![]),
            },
        );
        let metadata = ContractMetadata {
            address: "KT18amZmM5W7qDWVt2pH6uj7sCEd3kbzLrHT".to_string(),
            network: "mainnet".to_string(),
            scripts,
        };
        assert_eq!(storage_type(&metadata, BABYLON).unwrap().prim, Prim::Nat);
        assert_eq!(
            storage_type(&metadata, ATHENS).unwrap_err(),
            BigMapError::UnknownMetadata {
                address: "KT18amZmM5W7qDWVt2pH6uj7sCEd3kbzLrHT".to_string(),
                network: "mainnet".to_string(),
                protocol: ATHENS.to_string(),
            }
        );
    }
}
