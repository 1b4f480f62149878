//! Typed parsing of Micheline values against a type tree.
//!
//! The value tree is walked in lock-step with the type tree. Any shape
//! disagreement aborts the whole build; callers never see a partial graph.

use bcd_interchange::Micheline;
use std::sync::Arc;

use crate::ast::{Prim, TypeNode};
use crate::error::AstError;
use crate::node::Node;

mod compound;
mod primitive;

impl Node {
    /// Build a node graph for `value` typed by `ty`.
    pub fn build(ty: &Arc<TypeNode>, value: &Micheline) -> Result<Node, AstError> {
        parse(ty, value)
    }

    /// Build from raw Micheline JSON for both the type and the value.
    pub fn build_json(
        ty: &serde_json::Value,
        value: &serde_json::Value,
    ) -> Result<Node, AstError> {
        let ty = TypeNode::from_json(ty)?;
        let value = Micheline::from_json(value)?;
        Node::build(&ty, &value)
    }

    /// Build `value` against the subtree of `root` found at `path`.
    pub fn build_at(root: &Arc<TypeNode>, path: &str, value: &Micheline) -> Result<Node, AstError> {
        let ty = root.find_by_path(path).ok_or_else(|| AstError::PathNotFound {
            path: path.to_string(),
        })?;
        Node::build(&ty, value)
    }
}

pub(crate) fn parse(ty: &Arc<TypeNode>, value: &Micheline) -> Result<Node, AstError> {
    let value = match ty.prim {
        Prim::Pair
        | Prim::Or
        | Prim::Option
        | Prim::List
        | Prim::Set
        | Prim::Map
        | Prim::BigMap
        | Prim::Lambda => compound::parse(ty, value)?,
        _ => primitive::parse(ty, value)?,
    };
    Ok(Node {
        ty: Arc::clone(ty),
        value,
    })
}

fn mismatch(ty: &TypeNode, value: &Micheline, expected: &str) -> AstError {
    let got = value.prim_name().unwrap_or(value.kind());
    AstError::malformed(
        &ty.path,
        format!("expected {} for {}, got {}", expected, ty.prim, got),
    )
}

/// Matches a nullary or n-ary data constructor such as `Unit` or `Some x`.
fn constructor<'a>(value: &'a Micheline, name: &str, arity: usize) -> Option<&'a [Micheline]> {
    match value {
        Micheline::Prim { prim, args, .. } if prim == name && args.len() == arity => Some(args),
        _ => None,
    }
}
