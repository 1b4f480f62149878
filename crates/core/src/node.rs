//! Value nodes.
//!
//! A [`Node`] pairs a decoded [`Value`] with the [`TypeNode`] it was built
//! against. Graphs are built once by [`crate::parser`] and never mutated
//! afterwards; every downstream transformation borrows them.

use bcd_interchange::Micheline;
use num_bigint::BigInt;
use std::sync::Arc;

use crate::ast::{Prim, TypeNode};
use crate::encoding;
use crate::error::AstError;

/// Which side of an `or` is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Branch {
    Left,
    Right,
}

impl Branch {
    pub fn constructor(self) -> &'static str {
        match self {
            Branch::Left => "Left",
            Branch::Right => "Right",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Branch::Left => 0,
            Branch::Right => 1,
        }
    }
}

/// A big_map is either a pointer to lazily stored cells or, in parameters
/// and origination scripts, an inline literal.
#[derive(Debug, Clone)]
pub enum BigMapValue {
    Ptr(BigInt),
    Inline(Vec<(Node, Node)>),
}

/// Variant-specific payload of a node.
#[derive(Debug, Clone)]
pub enum Value {
    Int(BigInt),
    Nat(BigInt),
    Mutez(BigInt),
    /// Unix seconds.
    Timestamp(BigInt),
    Bytes(Vec<u8>),
    String(String),
    Bool(bool),
    Unit,
    Address(String),
    Contract(String),
    KeyHash(String),
    Key(String),
    Signature(String),
    ChainId(String),
    Pair(Box<Node>, Box<Node>),
    Or(Branch, Box<Node>),
    Option(Option<Box<Node>>),
    List(Vec<Node>),
    /// Sorted and deduplicated.
    Set(Vec<Node>),
    /// Sorted by key, keys unique.
    Map(Vec<(Node, Node)>),
    BigMap(BigMapValue),
    /// Opaque instruction sequence.
    Lambda(Micheline),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub ty: Arc<TypeNode>,
    pub value: Value,
}

impl Node {
    pub fn prim(&self) -> Prim {
        self.ty.prim
    }

    pub fn path(&self) -> &str {
        &self.ty.path
    }

    pub fn depth(&self) -> usize {
        self.ty.depth
    }

    pub fn annots(&self) -> &[String] {
        &self.ty.annots
    }

    /// Annotated name, if the type carries one.
    pub fn name(&self) -> Option<&str> {
        self.ty.annotated_name()
    }

    /// Direct children in declared order. Map entries yield key then value.
    pub fn children(&self) -> Vec<&Node> {
        match &self.value {
            Value::Pair(l, r) => vec![&**l, &**r],
            Value::Or(_, inner) | Value::Option(Some(inner)) => vec![&**inner],
            Value::List(items) | Value::Set(items) => items.iter().collect(),
            Value::Map(entries) | Value::BigMap(BigMapValue::Inline(entries)) => {
                entries.iter().flat_map(|(k, v)| [k, v]).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(
            self.value,
            Value::Pair(..)
                | Value::Or(..)
                | Value::Option(Some(_))
                | Value::List(_)
                | Value::Set(_)
                | Value::Map(_)
                | Value::BigMap(BigMapValue::Inline(_))
        )
    }

    /// All nodes whose type path equals `path`, in pre-order. List, set and
    /// map elements share their element type's path.
    pub fn find_by_path(&self, path: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_by_path(path, &mut out);
        out
    }

    fn collect_by_path<'a>(&'a self, path: &str, out: &mut Vec<&'a Node>) {
        if self.path() == path {
            out.push(self);
            return;
        }
        if !path.starts_with(self.path()) {
            return;
        }
        for child in self.children() {
            child.collect_by_path(path, out);
        }
    }

    /// First node in pre-order whose annotated name is `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        if self.name() == Some(name) {
            return Some(self);
        }
        self.children().into_iter().find_map(|c| c.find_by_name(name))
    }

    /// Readable Micheline form: timestamps as RFC3339 strings (when in
    /// range), addresses and keys as base58check strings.
    pub fn to_micheline(&self) -> Micheline {
        match &self.value {
            Value::Int(i) | Value::Nat(i) | Value::Mutez(i) => Micheline::int(i),
            Value::Timestamp(secs) => match encoding::format_timestamp(secs) {
                Some(text) => Micheline::String(text),
                None => Micheline::int(secs),
            },
            Value::Bytes(b) => Micheline::bytes(b),
            Value::String(s)
            | Value::Address(s)
            | Value::Contract(s)
            | Value::KeyHash(s)
            | Value::Key(s)
            | Value::Signature(s)
            | Value::ChainId(s) => Micheline::String(s.clone()),
            Value::Bool(true) => Micheline::prim("True", vec![]),
            Value::Bool(false) => Micheline::prim("False", vec![]),
            Value::Unit => Micheline::prim("Unit", vec![]),
            Value::Pair(l, r) => Micheline::prim("Pair", vec![l.to_micheline(), r.to_micheline()]),
            Value::Or(branch, inner) => {
                Micheline::prim(branch.constructor(), vec![inner.to_micheline()])
            }
            Value::Option(Some(inner)) => Micheline::prim("Some", vec![inner.to_micheline()]),
            Value::Option(None) => Micheline::prim("None", vec![]),
            Value::List(items) | Value::Set(items) => {
                Micheline::Seq(items.iter().map(Node::to_micheline).collect())
            }
            Value::Map(entries) | Value::BigMap(BigMapValue::Inline(entries)) => {
                Micheline::Seq(
                    entries
                        .iter()
                        .map(|(k, v)| Micheline::prim("Elt", vec![k.to_micheline(), v.to_micheline()]))
                        .collect(),
                )
            }
            Value::BigMap(BigMapValue::Ptr(ptr)) => Micheline::int(ptr),
            Value::Lambda(code) => code.clone(),
        }
    }

    /// Optimized Micheline form used on the wire: timestamps as integers,
    /// addresses, keys, signatures and chain ids as tagged bytes.
    pub fn to_optimized_micheline(&self) -> Result<Micheline, AstError> {
        let optimized = match &self.value {
            Value::Timestamp(secs) => Micheline::int(secs),
            Value::Address(s) | Value::Contract(s) => {
                Micheline::bytes(&self.optimize(s, encoding::address_to_bytes)?)
            }
            Value::KeyHash(s) => Micheline::bytes(&self.optimize(s, encoding::key_hash_to_bytes)?),
            Value::Key(s) => Micheline::bytes(&self.optimize(s, encoding::key_to_bytes)?),
            Value::Signature(s) => {
                Micheline::bytes(&self.optimize(s, encoding::signature_to_bytes)?)
            }
            Value::ChainId(s) => Micheline::bytes(&self.optimize(s, encoding::chain_id_to_bytes)?),
            Value::Pair(l, r) => Micheline::prim(
                "Pair",
                vec![l.to_optimized_micheline()?, r.to_optimized_micheline()?],
            ),
            Value::Or(branch, inner) => {
                Micheline::prim(branch.constructor(), vec![inner.to_optimized_micheline()?])
            }
            Value::Option(Some(inner)) => {
                Micheline::prim("Some", vec![inner.to_optimized_micheline()?])
            }
            Value::List(items) | Value::Set(items) => Micheline::Seq(
                items
                    .iter()
                    .map(Node::to_optimized_micheline)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Map(entries) | Value::BigMap(BigMapValue::Inline(entries)) => {
                let mut elts = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    elts.push(Micheline::prim(
                        "Elt",
                        vec![k.to_optimized_micheline()?, v.to_optimized_micheline()?],
                    ));
                }
                Micheline::Seq(elts)
            }
            _ => self.to_micheline(),
        };
        Ok(optimized)
    }

    fn optimize(&self, text: &str, f: fn(&str) -> Option<Vec<u8>>) -> Result<Vec<u8>, AstError> {
        f(text).ok_or_else(|| {
            AstError::malformed(
                self.path(),
                format!("'{}' is not a valid base58check {}", text, self.prim()),
            )
        })
    }
}
