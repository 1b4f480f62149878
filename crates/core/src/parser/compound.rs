//! Compound types: children are parsed recursively against the type's
//! arguments.

use bcd_interchange::Micheline;
use num_bigint::BigInt;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{constructor, mismatch, parse as parse_node};
use crate::ast::{Prim, TypeNode};
use crate::compare::{compare, sort_by_node};
use crate::error::AstError;
use crate::node::{BigMapValue, Branch, Node, Value};

pub(super) fn parse(ty: &Arc<TypeNode>, value: &Micheline) -> Result<Value, AstError> {
    match ty.prim {
        Prim::Pair => {
            let (left_ty, right_ty) = ty.arg2()?;
            let (left, right) = split_pair(ty, value)?;
            Ok(Value::Pair(
                Box::new(parse_node(left_ty, left)?),
                Box::new(parse_node(right_ty, &right)?),
            ))
        }
        Prim::Or => {
            let (left_ty, right_ty) = ty.arg2()?;
            if let Some([inner]) = constructor(value, "Left", 1) {
                Ok(Value::Or(Branch::Left, Box::new(parse_node(left_ty, inner)?)))
            } else if let Some([inner]) = constructor(value, "Right", 1) {
                Ok(Value::Or(Branch::Right, Box::new(parse_node(right_ty, inner)?)))
            } else {
                Err(mismatch(ty, value, "Left or Right"))
            }
        }
        Prim::Option => {
            let inner_ty = ty.arg1()?;
            if constructor(value, "None", 0).is_some() {
                Ok(Value::Option(None))
            } else if let Some([inner]) = constructor(value, "Some", 1) {
                Ok(Value::Option(Some(Box::new(parse_node(inner_ty, inner)?))))
            } else {
                Err(mismatch(ty, value, "Some or None"))
            }
        }
        Prim::List => {
            let elem_ty = ty.arg1()?;
            let items = sequence(ty, value)?;
            items
                .iter()
                .map(|item| parse_node(elem_ty, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        Prim::Set => {
            let elem_ty = ty.arg1()?;
            let mut items = sequence(ty, value)?
                .iter()
                .map(|item| parse_node(elem_ty, item))
                .collect::<Result<Vec<_>, _>>()?;
            sort_by_node(&mut items, |n| n)?;
            items.dedup_by(|a, b| matches!(compare(a, b), Ok(Ordering::Equal)));
            Ok(Value::Set(items))
        }
        Prim::Map => entries(ty, value).map(Value::Map),
        Prim::BigMap => match value {
            Micheline::Int(text) => text
                .parse::<BigInt>()
                .map(|ptr| Value::BigMap(BigMapValue::Ptr(ptr)))
                .map_err(|_| AstError::malformed(&ty.path, format!("invalid big_map pointer '{}'", text))),
            _ => entries(ty, value).map(|e| Value::BigMap(BigMapValue::Inline(e))),
        },
        Prim::Lambda => match value {
            Micheline::Seq(_) | Micheline::Prim { .. } => Ok(Value::Lambda(value.clone())),
            other => Err(mismatch(ty, other, "instruction sequence")),
        },
        other => Err(AstError::invalid_type(
            &ty.path,
            format!("{} is not a compound type", other),
        )),
    }
}

/// Split a pair value into its head and the (possibly re-combed) tail.
fn split_pair<'a>(
    ty: &TypeNode,
    value: &'a Micheline,
) -> Result<(&'a Micheline, Cow<'a, Micheline>), AstError> {
    let items: &[Micheline] = match value {
        Micheline::Prim { prim, args, .. } if prim == "Pair" => args,
        Micheline::Seq(items) => items,
        other => return Err(mismatch(ty, other, "Pair")),
    };
    match items {
        [left, right] => Ok((left, Cow::Borrowed(right))),
        [left, rest @ ..] if rest.len() > 1 => {
            Ok((left, Cow::Owned(Micheline::prim("Pair", rest.to_vec()))))
        }
        _ => Err(AstError::malformed(
            &ty.path,
            format!("pair expects at least 2 components, got {}", items.len()),
        )),
    }
}

fn sequence<'a>(ty: &TypeNode, value: &'a Micheline) -> Result<&'a [Micheline], AstError> {
    match value {
        Micheline::Seq(items) => Ok(items),
        other => Err(mismatch(ty, other, "sequence")),
    }
}

/// `{ Elt k v ; ... }` sorted by key. Duplicate keys are rejected.
fn entries(ty: &TypeNode, value: &Micheline) -> Result<Vec<(Node, Node)>, AstError> {
    let (key_ty, value_ty) = ty.arg2()?;
    let mut out = Vec::new();
    for item in sequence(ty, value)? {
        let [k, v] = constructor(item, "Elt", 2)
            .and_then(|args| <&[Micheline; 2]>::try_from(args).ok())
            .ok_or_else(|| mismatch(ty, item, "Elt"))?;
        out.push((parse_node(key_ty, k)?, parse_node(value_ty, v)?));
    }
    sort_by_node(&mut out, |(k, _)| k)?;
    for pair in out.windows(2) {
        if compare(&pair[0].0, &pair[1].0)? == Ordering::Equal {
            return Err(AstError::malformed(
                &ty.path,
                format!(
                    "duplicate map key {}",
                    crate::format::to_michelson_inline(&pair[0].0.to_micheline())
                ),
            ));
        }
    }
    Ok(out)
}
