//! Miguel: presentation trees for display and diffing.
//!
//! A [`MiguelNode`] drops most type metadata and keeps what a UI needs:
//! primitive, path, name, display value and change status. Unnamed nested
//! pairs are flattened into their parent, `Some x` is shown as `x` under the
//! option's name, and map values are named after their key.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::ast::{Prim, TypeNode};
use crate::compare::{compare, equal};
use crate::encoding;
use crate::error::AstError;
use crate::format::to_michelson_inline;
use crate::node::{BigMapValue, Branch, Node, Value};
use crate::unpack::try_unpack_string;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    #[default]
    Unchanged,
    Added,
    Removed,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiguelNode {
    #[serde(rename = "type")]
    pub prim: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
    /// Previous display value of an updated leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Json>,
    #[serde(default)]
    pub status: DiffStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MiguelNode>,
}

impl MiguelNode {
    fn shell(ty: &TypeNode) -> MiguelNode {
        MiguelNode {
            prim: ty.prim.keyword().to_string(),
            path: ty.path.clone(),
            name: ty.annotated_name().map(str::to_string),
            value: None,
            from: None,
            status: DiffStatus::Unchanged,
            children: Vec::new(),
        }
    }

    /// This node followed by all descendants, pre-order.
    pub fn descendants(&self) -> Vec<&MiguelNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    fn with_status(mut self, status: DiffStatus) -> MiguelNode {
        self.status = status;
        self.children = self
            .children
            .into_iter()
            .map(|c| c.with_status(status))
            .collect();
        self
    }

    /// Updated if any child changed.
    fn settle(mut self) -> MiguelNode {
        if self.children.iter().any(|c| c.status != DiffStatus::Unchanged) {
            self.status = DiffStatus::Updated;
        }
        self
    }
}

// ──────────────────────────────────────────────
// Display values
// ──────────────────────────────────────────────

/// Human-readable text of a leaf, `None` for compound nodes.
///
/// Byte strings that hold a packed expression are shown as that
/// expression in inline Michelson.
pub(crate) fn display_text(node: &Node) -> Option<String> {
    let text = match &node.value {
        Value::Int(i) | Value::Nat(i) | Value::Mutez(i) => i.to_string(),
        Value::Timestamp(secs) => {
            encoding::format_timestamp(secs).unwrap_or_else(|| secs.to_string())
        }
        Value::Bytes(b) => match try_unpack_string(b) {
            Some(expr) => to_michelson_inline(&expr),
            None => hex::encode(b),
        },
        Value::String(s)
        | Value::Address(s)
        | Value::Contract(s)
        | Value::KeyHash(s)
        | Value::Key(s)
        | Value::Signature(s)
        | Value::ChainId(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Unit => "Unit".to_string(),
        Value::Option(None) => "None".to_string(),
        Value::BigMap(BigMapValue::Ptr(ptr)) => ptr.to_string(),
        Value::Lambda(code) => to_michelson_inline(code),
        _ => return None,
    };
    Some(text)
}

fn leaf_value(node: &Node) -> Option<Json> {
    match &node.value {
        Value::Bool(b) => Some(json!(b)),
        _ => display_text(node).map(Json::String),
    }
}

fn key_label(key: &Node) -> String {
    display_text(key).unwrap_or_else(|| to_michelson_inline(&key.to_micheline()))
}

fn keyed(key: &Node, mut value: MiguelNode) -> MiguelNode {
    value.name = Some(key_label(key));
    value
}

/// `Some x` is presented as `x`, named after the option when it has a name.
fn present_option(option: &Node, mut inner: MiguelNode) -> MiguelNode {
    if let Some(name) = option.name() {
        inner.name = Some(name.to_string());
    }
    inner
}

fn flattens(child: &Node) -> bool {
    matches!(child.value, Value::Pair(..)) && child.name().is_none()
}

fn push_pair_child(children: &mut Vec<MiguelNode>, child: &Node, presented: MiguelNode) {
    if flattens(child) {
        children.extend(presented.children);
    } else {
        children.push(presented);
    }
}

// ──────────────────────────────────────────────
// Presentation
// ──────────────────────────────────────────────

/// Presentation tree of a single value; every status is `Unchanged`.
pub fn to_miguel(node: &Node) -> MiguelNode {
    let mut out = MiguelNode::shell(&node.ty);
    match &node.value {
        Value::Pair(l, r) => {
            push_pair_child(&mut out.children, l, to_miguel(l));
            push_pair_child(&mut out.children, r, to_miguel(r));
        }
        Value::Or(_, inner) => out.children.push(to_miguel(inner)),
        Value::Option(Some(inner)) => return present_option(node, to_miguel(inner)),
        Value::List(items) | Value::Set(items) => {
            out.children = items.iter().map(to_miguel).collect();
        }
        Value::Map(entries) | Value::BigMap(BigMapValue::Inline(entries)) => {
            out.children = entries.iter().map(|(k, v)| keyed(k, to_miguel(v))).collect();
        }
        _ => out.value = leaf_value(node),
    }
    out
}

// ──────────────────────────────────────────────
// Diffing
// ──────────────────────────────────────────────

/// Change-annotated tree from `previous` to `current`.
///
/// Both roots must share a primitive. Below the root, subtrees whose
/// primitives disagree are omitted. Big maps held by pointer are compared
/// by identifier; see [`diff_entries`] for content diffs.
pub fn diff(previous: &Node, current: &Node) -> Result<MiguelNode, AstError> {
    if previous.prim() != current.prim() {
        return Err(AstError::NotComparable {
            left: format!("{} at {}", previous.prim(), previous.path()),
            right: format!("{} at {}", current.prim(), current.path()),
        });
    }
    diff_node(previous, current)?.ok_or_else(|| AstError::NotComparable {
        left: previous.path().to_string(),
        right: current.path().to_string(),
    })
}

/// Diff two key-sorted entry lists of the map or big_map typed `ty`.
pub fn diff_entries(
    ty: &Arc<TypeNode>,
    previous: &[(Node, Node)],
    current: &[(Node, Node)],
) -> Result<MiguelNode, AstError> {
    let mut out = MiguelNode::shell(ty);
    out.children = merge_entries(previous, current)?;
    Ok(out.settle())
}

fn diff_node(prev: &Node, cur: &Node) -> Result<Option<MiguelNode>, AstError> {
    if prev.prim() != cur.prim() {
        tracing::debug!(
            path = cur.path(),
            previous = %prev.prim(),
            current = %cur.prim(),
            "primitive changed, subtree not displayable"
        );
        return Ok(None);
    }
    if !same_keys(&prev.ty, &cur.ty) {
        tracing::debug!(
            path = cur.path(),
            "element or key type changed, collection not displayable"
        );
        return Ok(None);
    }
    let mut out = MiguelNode::shell(&cur.ty);
    let presented = match (&prev.value, &cur.value) {
        (Value::Pair(pl, pr), Value::Pair(cl, cr)) => {
            for (p, c) in [(pl, cl), (pr, cr)] {
                if let Some(child) = diff_node(p, c)? {
                    push_pair_child(&mut out.children, c, child);
                }
            }
            out.settle()
        }
        (Value::Or(pb, pi), Value::Or(cb, ci)) if pb == cb => {
            if let Some(child) = diff_node(pi, ci)? {
                out.children.push(child);
            }
            out.settle()
        }
        (Value::Or(pb, pi), Value::Or(_, ci)) => {
            let removed = to_miguel(pi).with_status(DiffStatus::Removed);
            let added = to_miguel(ci).with_status(DiffStatus::Added);
            out.children = match pb {
                Branch::Left => vec![removed, added],
                Branch::Right => vec![added, removed],
            };
            out.status = DiffStatus::Updated;
            out
        }
        (Value::Option(Some(p)), Value::Option(Some(c))) => {
            return Ok(diff_node(p, c)?.map(|m| present_option(cur, m)));
        }
        (Value::Option(None), Value::Option(Some(c))) => {
            present_option(cur, to_miguel(c)).with_status(DiffStatus::Added)
        }
        (Value::Option(Some(p)), Value::Option(None)) => {
            present_option(prev, to_miguel(p)).with_status(DiffStatus::Removed)
        }
        (Value::List(p), Value::List(c)) => {
            for i in 0..p.len().max(c.len()) {
                let child = match (p.get(i), c.get(i)) {
                    (Some(p), Some(c)) => diff_node(p, c)?,
                    (Some(p), None) => Some(to_miguel(p).with_status(DiffStatus::Removed)),
                    (None, Some(c)) => Some(to_miguel(c).with_status(DiffStatus::Added)),
                    (None, None) => None,
                };
                out.children.extend(child);
            }
            out.settle()
        }
        (Value::Set(p), Value::Set(c)) => {
            out.children = merge_sorted(
                p.as_slice(),
                c.as_slice(),
                |n| n,
                |p, c| diff_node(p, c),
                |n, status| to_miguel(n).with_status(status),
            )?;
            out.settle()
        }
        (Value::Map(p), Value::Map(c))
        | (Value::BigMap(BigMapValue::Inline(p)), Value::BigMap(BigMapValue::Inline(c))) => {
            out.children = merge_entries(p, c)?;
            out.settle()
        }
        _ => leaf_diff(prev, cur)?,
    };
    Ok(Some(presented))
}

/// Sets and maps are aligned by comparing elements or keys, which needs
/// both sides to share the element or key type shape.
fn same_keys(prev: &TypeNode, cur: &TypeNode) -> bool {
    if !matches!(cur.prim, Prim::Set | Prim::Map | Prim::BigMap) {
        return true;
    }
    match (prev.args.first(), cur.args.first()) {
        (Some(p), Some(c)) => same_shape(p, c),
        _ => true,
    }
}

fn same_shape(a: &TypeNode, b: &TypeNode) -> bool {
    a.prim == b.prim
        && a.args.len() == b.args.len()
        && a.args.iter().zip(&b.args).all(|(x, y)| same_shape(x, y))
}

fn leaf_diff(prev: &Node, cur: &Node) -> Result<MiguelNode, AstError> {
    let mut out = to_miguel(cur);
    if !equal(prev, cur)? {
        out.status = DiffStatus::Updated;
        out.from = leaf_value(prev);
    }
    Ok(out)
}

fn merge_entries(
    prev: &[(Node, Node)],
    cur: &[(Node, Node)],
) -> Result<Vec<MiguelNode>, AstError> {
    merge_sorted(
        prev,
        cur,
        |(k, _)| k,
        |(_, pv), (ck, cv)| Ok(diff_node(pv, cv)?.map(|m| keyed(ck, m))),
        |(k, v), status| keyed(k, to_miguel(v)).with_status(status),
    )
}

/// Walk two sorted sequences in step. Items present on both sides are
/// diffed, the rest are reported whole as removed or added.
fn merge_sorted<T>(
    prev: &[T],
    cur: &[T],
    key: impl Fn(&T) -> &Node,
    both: impl Fn(&T, &T) -> Result<Option<MiguelNode>, AstError>,
    single: impl Fn(&T, DiffStatus) -> MiguelNode,
) -> Result<Vec<MiguelNode>, AstError> {
    let mut out = Vec::with_capacity(prev.len().max(cur.len()));
    let (mut i, mut j) = (0, 0);
    while i < prev.len() || j < cur.len() {
        let ord = match (prev.get(i), cur.get(j)) {
            (Some(p), Some(c)) => compare(key(p), key(c))?,
            (Some(_), None) => Ordering::Less,
            _ => Ordering::Greater,
        };
        match ord {
            Ordering::Less => {
                out.push(single(&prev[i], DiffStatus::Removed));
                i += 1;
            }
            Ordering::Greater => {
                out.push(single(&cur[j], DiffStatus::Added));
                j += 1;
            }
            Ordering::Equal => {
                out.extend(both(&prev[i], &cur[j])?);
                i += 1;
                j += 1;
            }
        }
    }
    Ok(out)
}
