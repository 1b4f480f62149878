use std::sync::Arc;

use bcd_core::{Prim, TypeNode};
use bcd_interchange::{BigMapDiffCell, Micheline};
use serde::Serialize;
use serde_json::json;

use crate::error::BigMapError;
use crate::prepare::{cell_big_map, prepare_cell};
use crate::traits::BigMapHandler;

/// Output of the handler that took a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Processed {
    pub handler: &'static str,
    pub output: serde_json::Value,
}

/// An explicit, ordered list of handlers.
///
/// The pipeline holds no global state; callers build one and pass it to
/// whatever drives the cell stream.
pub struct Pipeline {
    handlers: Vec<Box<dyn BigMapHandler>>,
}

impl Pipeline {
    pub fn new(handlers: Vec<Box<dyn BigMapHandler>>) -> Self {
        Pipeline { handlers }
    }

    /// Contract metadata cells first, then everything else as prepared cells.
    pub fn standard() -> Self {
        Pipeline::new(vec![
            Box::new(MetadataHandler),
            Box::new(PreparedCellHandler),
        ])
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run `cell` through the first handler that accepts its big map.
    /// `Ok(None)` when no handler does.
    pub fn process(
        &self,
        cell: &BigMapDiffCell,
        storage: &Arc<TypeNode>,
    ) -> Result<Option<Processed>, BigMapError> {
        let big_map = cell_big_map(cell, storage)?;
        for handler in &self.handlers {
            if !handler.accepts(&big_map) {
                continue;
            }
            tracing::debug!(
                handler = handler.name(),
                ptr = cell.ptr,
                path = %big_map.path,
                "dispatching big_map cell"
            );
            let output = handler.handle(cell, storage)?;
            return Ok(Some(Processed {
                handler: handler.name(),
                output,
            }));
        }
        tracing::trace!(ptr = cell.ptr, "no handler accepted big_map cell");
        Ok(None)
    }
}

// ──────────────────────────────────────────────
// Handlers
// ──────────────────────────────────────────────

/// Contract metadata: a `%metadata` big map from string keys to bytes
/// holding UTF-8 text (a URI under the empty key, JSON documents under
/// the others).
pub struct MetadataHandler;

impl BigMapHandler for MetadataHandler {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn accepts(&self, big_map: &TypeNode) -> bool {
        big_map.field_name() == Some("metadata")
            && matches!(
                big_map.args.as_slice(),
                [key, value] if key.prim == Prim::String && value.prim == Prim::Bytes
            )
    }

    fn handle(
        &self,
        cell: &BigMapDiffCell,
        _storage: &Arc<TypeNode>,
    ) -> Result<serde_json::Value, BigMapError> {
        let fail = |reason: &str| BigMapError::Handler {
            handler: self.name().to_string(),
            reason: reason.to_string(),
        };
        let Micheline::String(key) = &cell.key else {
            return Err(fail("key is not a string"));
        };
        let Some(value) = &cell.value else {
            return Ok(json!({ "key": key, "removed": true }));
        };
        let bytes = value
            .bytes_value()
            .ok_or_else(|| fail("value is not a byte string"))?;
        let text = String::from_utf8(bytes).map_err(|_| fail("value is not UTF-8 text"))?;
        Ok(json!({ "key": key, "value": text }))
    }
}

/// Fallback for any big map: the cell as a [`crate::PreparedCell`].
pub struct PreparedCellHandler;

impl BigMapHandler for PreparedCellHandler {
    fn name(&self) -> &'static str {
        "cell"
    }

    fn accepts(&self, _big_map: &TypeNode) -> bool {
        true
    }

    fn handle(
        &self,
        cell: &BigMapDiffCell,
        storage: &Arc<TypeNode>,
    ) -> Result<serde_json::Value, BigMapError> {
        let prepared = prepare_cell(cell, storage)?;
        serde_json::to_value(&prepared).map_err(|e| BigMapError::Handler {
            handler: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BABYLON: &str = "PsBabyM1eUXZseaJdmXFApDSBqj8YBfwELoxZHHW77EMcAbbwAS";

    fn storage() -> Arc<TypeNode> {
        TypeNode::from_json(&json!({
            "prim": "pair",
            "args": [
                {"prim": "big_map", "annots": ["%ledger"], "args": [
                    {"prim": "address"}, {"prim": "nat"}
                ]},
                {"prim": "big_map", "annots": ["%metadata"], "args": [
                    {"prim": "string"}, {"prim": "bytes"}
                ]}
            ]
        }))
        .unwrap()
    }

    fn cell(bin_path: &str, key: Micheline, value: Option<Micheline>) -> BigMapDiffCell {
        BigMapDiffCell {
            ptr: 3,
            key,
            key_hash: String::new(),
            value,
            bin_path: bin_path.to_string(),
            address: "KT18amZmM5W7qDWVt2pH6uj7sCEd3kbzLrHT".to_string(),
            network: "mainnet".to_string(),
            protocol: BABYLON.to_string(),
            level: 10,
            timestamp: String::new(),
        }
    }

    fn metadata_cell(value: &[u8]) -> BigMapDiffCell {
        cell("0/1", Micheline::string(""), Some(Micheline::bytes(value)))
    }

    /// Accepts everything and records that it ran.
    struct Tagging(&'static str);

    impl BigMapHandler for Tagging {
        fn name(&self) -> &'static str {
            self.0
        }

        fn accepts(&self, _big_map: &TypeNode) -> bool {
            true
        }

        fn handle(
            &self,
            _cell: &BigMapDiffCell,
            _storage: &Arc<TypeNode>,
        ) -> Result<serde_json::Value, BigMapError> {
            Ok(json!(self.0))
        }
    }

    #[test]
    fn metadata_cells_go_to_metadata_handler() {
        let processed = Pipeline::standard()
            .process(&metadata_cell(b"tezos-storage:here"), &storage())
            .unwrap()
            .unwrap();
        assert_eq!(processed.handler, "metadata");
        assert_eq!(
            processed.output,
            json!({"key": "", "value": "tezos-storage:here"})
        );
    }

    #[test]
    fn other_cells_fall_through_to_prepared_cells() {
        let c = cell(
            "0/0",
            Micheline::string("tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx"),
            Some(Micheline::int(5)),
        );
        let processed = Pipeline::standard().process(&c, &storage()).unwrap().unwrap();
        assert_eq!(processed.handler, "cell");
        assert_eq!(
            processed.output["key_string"],
            json!("tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx")
        );
        assert_eq!(processed.output["value"]["value"], json!("5"));
    }

    #[test]
    fn first_accepting_handler_wins() {
        let pipeline = Pipeline::new(vec![Box::new(Tagging("first")), Box::new(Tagging("second"))]);
        assert_eq!(pipeline.handler_names(), vec!["first", "second"]);
        let processed = pipeline
            .process(&metadata_cell(b"x"), &storage())
            .unwrap()
            .unwrap();
        assert_eq!(processed.handler, "first");
    }

    #[test]
    fn empty_pipeline_processes_nothing() {
        let pipeline = Pipeline::new(Vec::new());
        assert_eq!(pipeline.process(&metadata_cell(b"x"), &storage()).unwrap(), None);
    }

    #[test]
    fn handler_failures_name_the_handler() {
        let err = Pipeline::standard()
            .process(&metadata_cell(&[0xff, 0xfe]), &storage())
            .unwrap_err();
        assert_eq!(
            err,
            BigMapError::Handler {
                handler: "metadata".to_string(),
                reason: "value is not UTF-8 text".to_string()
            }
        );
    }

    #[test]
    fn metadata_removal() {
        let c = cell("0/1", Micheline::string("contents"), None);
        let processed = Pipeline::standard().process(&c, &storage()).unwrap().unwrap();
        assert_eq!(processed.output, json!({"key": "contents", "removed": true}));
    }
}
