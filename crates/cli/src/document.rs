//! Input documents.
//!
//! A value document holds a type tree and up to two value trees:
//!
//! ```json
//! {"type": {"prim": "nat"}, "previous": {"int": "1"}, "value": {"int": "2"}}
//! ```
//!
//! A big-map document holds contract metadata, the bin path of one big map
//! and two cell sets (`previous`, `current`).

use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use bcd_bigmap::latest_ptr;
use bcd_core::{Micheline, Node, TypeNode};
use bcd_interchange::{
    parse_big_map_diffs, parse_contract_metadata, BigMapDiffCell, ContractMetadata,
};
use serde_json::Value as Json;

use crate::{Context, Side};

pub(crate) fn read_json(path: &Path, ctx: &Context) -> Json {
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => ctx.fail(&format!("error reading '{}': {}", path.display(), e)),
    };
    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => ctx.fail(&format!("error parsing JSON in '{}': {}", path.display(), e)),
    }
}

// ── Value documents ───────────────────────────────────────────────────

pub(crate) struct ValueDocument {
    pub ty: Arc<TypeNode>,
    raw: Json,
    source: String,
}

impl ValueDocument {
    pub(crate) fn load(path: &Path, ctx: &Context) -> ValueDocument {
        let raw = read_json(path, ctx);
        let Some(ty_json) = raw.get("type") else {
            ctx.fail(&format!("'{}' has no \"type\" field", path.display()));
        };
        let ty = match TypeNode::from_json(ty_json) {
            Ok(t) => t,
            Err(e) => ctx.fail(&format!("invalid type in '{}': {}", path.display(), e)),
        };
        ValueDocument {
            ty,
            raw,
            source: path.display().to_string(),
        }
    }

    pub(crate) fn has(&self, side: Side) -> bool {
        self.raw.get(side.key()).is_some()
    }

    /// Typed node of the value stored under `side`.
    pub(crate) fn node(&self, side: Side, ctx: &Context) -> Node {
        let Some(json) = self.raw.get(side.key()) else {
            ctx.fail(&format!("'{}' has no \"{}\" field", self.source, side.key()));
        };
        let built = Micheline::from_json(json)
            .map_err(bcd_core::AstError::from)
            .and_then(|m| Node::build(&self.ty, &m));
        match built {
            Ok(node) => node,
            Err(e) => ctx.fail(&format!("{} [{}]: {}", self.source, side.key(), e)),
        }
    }
}

// ── Big-map documents ─────────────────────────────────────────────────

pub(crate) struct BigMapDocument {
    pub contract: ContractMetadata,
    pub bin_path: String,
    pub ptr: Option<i64>,
    pub previous: Vec<BigMapDiffCell>,
    pub current: Vec<BigMapDiffCell>,
}

impl BigMapDocument {
    pub(crate) fn load(path: &Path, ctx: &Context) -> BigMapDocument {
        let raw = read_json(path, ctx);
        let contract = or_fail(parse_contract_metadata(&raw["contract"]), "contract", path, ctx);
        let previous = match raw.get("previous") {
            Some(cells) => or_fail(parse_big_map_diffs(cells), "previous cells", path, ctx),
            None => Vec::new(),
        };
        let current = match raw.get("current") {
            Some(cells) => or_fail(parse_big_map_diffs(cells), "current cells", path, ctx),
            None => Vec::new(),
        };
        let Some(bin_path) = raw["bin_path"].as_str() else {
            ctx.fail(&format!("'{}' has no \"bin_path\" field", path.display()));
        };
        let ptr = match raw.get("ptr") {
            None => None,
            Some(p) => match p.as_i64() {
                Some(p) => Some(p),
                None => ctx.fail(&format!("invalid ptr in '{}': expected an integer", path.display())),
            },
        };
        BigMapDocument {
            contract,
            bin_path: bin_path.to_string(),
            ptr,
            previous,
            current,
        }
    }

    /// The explicit pointer, else the pointer of the newest cell at the bin path.
    pub(crate) fn ptr(&self) -> Option<i64> {
        self.ptr
            .or_else(|| latest_ptr(&self.current, &self.bin_path))
            .or_else(|| latest_ptr(&self.previous, &self.bin_path))
    }

    /// Protocol of the newest cell, used to pick the storage type.
    pub(crate) fn protocol(&self) -> Option<&str> {
        self.current
            .iter()
            .chain(&self.previous)
            .max_by_key(|c| c.level)
            .map(|c| c.protocol.as_str())
    }
}

fn or_fail<T, E: Display>(result: Result<T, E>, what: &str, path: &Path, ctx: &Context) -> T {
    match result {
        Ok(v) => v,
        Err(e) => ctx.fail(&format!("invalid {} in '{}': {}", what, path.display(), e)),
    }
}
