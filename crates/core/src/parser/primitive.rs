//! Leaf primitives.

use bcd_interchange::Micheline;
use num_bigint::{BigInt, Sign};

use super::{constructor, mismatch};
use crate::ast::{Prim, TypeNode};
use crate::encoding;
use crate::error::AstError;
use crate::node::Value;

pub(super) fn parse(ty: &TypeNode, value: &Micheline) -> Result<Value, AstError> {
    let path = ty.path.as_str();
    match ty.prim {
        Prim::Int => int_literal(ty, value).map(Value::Int),
        Prim::Nat => {
            let n = int_literal(ty, value)?;
            if n.sign() == Sign::Minus {
                return Err(AstError::malformed(path, format!("nat must be non-negative, got {}", n)));
            }
            Ok(Value::Nat(n))
        }
        Prim::Mutez => {
            let n = int_literal(ty, value)?;
            if n.sign() == Sign::Minus || n > BigInt::from(i64::MAX) {
                return Err(AstError::malformed(path, format!("mutez out of range: {}", n)));
            }
            Ok(Value::Mutez(n))
        }
        Prim::Timestamp => match value {
            Micheline::Int(_) => int_literal(ty, value).map(Value::Timestamp),
            Micheline::String(text) => encoding::parse_timestamp(text)
                .map(Value::Timestamp)
                .ok_or_else(|| AstError::malformed(path, format!("invalid RFC3339 timestamp '{}'", text))),
            other => Err(mismatch(ty, other, "int or RFC3339 string")),
        },
        Prim::Bytes => match value {
            Micheline::Bytes(_) => value
                .bytes_value()
                .map(Value::Bytes)
                .ok_or_else(|| AstError::malformed(path, "invalid hex in bytes literal")),
            other => Err(mismatch(ty, other, "bytes literal")),
        },
        Prim::String => match value {
            Micheline::String(s) => Ok(Value::String(s.clone())),
            other => Err(mismatch(ty, other, "string literal")),
        },
        Prim::Bool => {
            if constructor(value, "True", 0).is_some() {
                Ok(Value::Bool(true))
            } else if constructor(value, "False", 0).is_some() {
                Ok(Value::Bool(false))
            } else {
                Err(mismatch(ty, value, "True or False"))
            }
        }
        Prim::Unit => constructor(value, "Unit", 0)
            .map(|_| Value::Unit)
            .ok_or_else(|| mismatch(ty, value, "Unit")),
        Prim::Address => {
            encoded(ty, value, encoding::is_address, encoding::address_from_bytes).map(Value::Address)
        }
        Prim::Contract => {
            encoded(ty, value, encoding::is_address, encoding::address_from_bytes).map(Value::Contract)
        }
        Prim::KeyHash => {
            encoded(ty, value, encoding::is_key_hash, encoding::key_hash_from_bytes).map(Value::KeyHash)
        }
        Prim::Key => encoded(ty, value, encoding::is_key, encoding::key_from_bytes).map(Value::Key),
        Prim::Signature => {
            encoded(ty, value, encoding::is_signature, encoding::signature_from_bytes)
                .map(Value::Signature)
        }
        Prim::ChainId => {
            encoded(ty, value, encoding::is_chain_id, encoding::chain_id_from_bytes).map(Value::ChainId)
        }
        Prim::Never => Err(AstError::malformed(path, "type never has no values")),
        other => Err(AstError::invalid_type(path, format!("{} is not a leaf type", other))),
    }
}

fn int_literal(ty: &TypeNode, value: &Micheline) -> Result<BigInt, AstError> {
    match value {
        Micheline::Int(text) => text
            .parse::<BigInt>()
            .map_err(|_| AstError::malformed(&ty.path, format!("invalid integer literal '{}'", text))),
        other => Err(mismatch(ty, other, "int literal")),
    }
}

/// base58check string in readable form, tagged bytes in optimized form.
fn encoded(
    ty: &TypeNode,
    value: &Micheline,
    validate: fn(&str) -> bool,
    from_bytes: fn(&[u8]) -> Option<String>,
) -> Result<String, AstError> {
    match value {
        Micheline::String(text) if validate(text) => Ok(text.clone()),
        Micheline::String(text) => Err(AstError::malformed(
            &ty.path,
            format!("'{}' is not a valid {}", text, ty.prim),
        )),
        Micheline::Bytes(hex) => value
            .bytes_value()
            .and_then(|raw| from_bytes(&raw))
            .ok_or_else(|| {
                AstError::malformed(&ty.path, format!("0x{} is not an optimized {}", hex, ty.prim))
            }),
        other => Err(mismatch(ty, other, "string or bytes literal")),
    }
}
