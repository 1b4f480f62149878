//! Structural comparator.
//!
//! A total order over nodes of identical primitive. Comparing nodes of
//! different primitives is an error, never a fallback ordering.

use std::cmp::Ordering;

use crate::encoding;
use crate::error::AstError;
use crate::node::{BigMapValue, Node, Value};

/// Order two nodes of the same primitive.
///
/// - numbers by value, strings and encoded strings lexicographically, bytes
///   lexicographically over the raw bytes, `False < True`
/// - pairs left child first
/// - `Left _ < Right _`, then by payload
/// - `None < Some _`
/// - lists, sets and maps lexicographically over their elements, shorter
///   prefix first
/// - big_map pointers numerically, any pointer before any inline literal
/// - signatures by raw payload, so `edsig…` and the generic `sig…` spelling
///   of the same bytes are equal
/// - lambdas by the canonical JSON text of their code
pub fn compare(a: &Node, b: &Node) -> Result<Ordering, AstError> {
    if a.prim() != b.prim() {
        return Err(not_comparable(a, b));
    }
    let ord = match (&a.value, &b.value) {
        (Value::Int(x), Value::Int(y))
        | (Value::Nat(x), Value::Nat(y))
        | (Value::Mutez(x), Value::Mutez(y))
        | (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::String(x), Value::String(y))
        | (Value::Address(x), Value::Address(y))
        | (Value::Contract(x), Value::Contract(y))
        | (Value::KeyHash(x), Value::KeyHash(y))
        | (Value::Key(x), Value::Key(y))
        | (Value::ChainId(x), Value::ChainId(y)) => x.cmp(y),
        (Value::Signature(x), Value::Signature(y)) => compare_signatures(x, y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Unit, Value::Unit) => Ordering::Equal,
        (Value::Pair(al, ar), Value::Pair(bl, br)) => match compare(al, bl)? {
            Ordering::Equal => compare(ar, br)?,
            ord => ord,
        },
        (Value::Or(ab, ai), Value::Or(bb, bi)) => match ab.cmp(bb) {
            Ordering::Equal => compare(ai, bi)?,
            ord => ord,
        },
        (Value::Option(x), Value::Option(y)) => match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare(x, y)?,
        },
        (Value::List(x), Value::List(y)) | (Value::Set(x), Value::Set(y)) => compare_seq(x, y)?,
        (Value::Map(x), Value::Map(y)) => compare_entries(x, y)?,
        (Value::BigMap(x), Value::BigMap(y)) => match (x, y) {
            (BigMapValue::Ptr(p), BigMapValue::Ptr(q)) => p.cmp(q),
            (BigMapValue::Ptr(_), BigMapValue::Inline(_)) => Ordering::Less,
            (BigMapValue::Inline(_), BigMapValue::Ptr(_)) => Ordering::Greater,
            (BigMapValue::Inline(x), BigMapValue::Inline(y)) => compare_entries(x, y)?,
        },
        (Value::Lambda(x), Value::Lambda(y)) => x.to_json().to_string().cmp(&y.to_json().to_string()),
        _ => return Err(not_comparable(a, b)),
    };
    Ok(ord)
}

/// `compare(a, b) == Equal`.
pub fn equal(a: &Node, b: &Node) -> Result<bool, AstError> {
    compare(a, b).map(|ord| ord == Ordering::Equal)
}

/// Decodable signatures first, by payload; the rest by text.
fn compare_signatures(x: &str, y: &str) -> Ordering {
    match (encoding::signature_to_bytes(x), encoding::signature_to_bytes(y)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => x.cmp(y),
    }
}

fn compare_seq(x: &[Node], y: &[Node]) -> Result<Ordering, AstError> {
    for (a, b) in x.iter().zip(y) {
        let ord = compare(a, b)?;
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(x.len().cmp(&y.len()))
}

fn compare_entries(x: &[(Node, Node)], y: &[(Node, Node)]) -> Result<Ordering, AstError> {
    for ((ak, av), (bk, bv)) in x.iter().zip(y) {
        let ord = match compare(ak, bk)? {
            Ordering::Equal => compare(av, bv)?,
            ord => ord,
        };
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(x.len().cmp(&y.len()))
}

fn not_comparable(a: &Node, b: &Node) -> AstError {
    AstError::NotComparable {
        left: format!("{} at {}", a.prim(), a.path()),
        right: format!("{} at {}", b.prim(), b.path()),
    }
}

/// Sort by the comparator, reporting the first comparison failure.
pub fn sort_by_node<T>(items: &mut [T], key: impl Fn(&T) -> &Node) -> Result<(), AstError> {
    let mut failure = None;
    items.sort_by(|a, b| match compare(key(a), key(b)) {
        Ok(ord) => ord,
        Err(e) => {
            failure.get_or_insert(e);
            Ordering::Equal
        }
    });
    failure.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(ty: serde_json::Value, value: serde_json::Value) -> Node {
        Node::build_json(&ty, &value).unwrap()
    }

    fn int(v: i64) -> Node {
        node(json!({"prim": "int"}), json!({"int": v.to_string()}))
    }

    #[test]
    fn numbers_by_value() {
        assert_eq!(compare(&int(5), &int(5)).unwrap(), Ordering::Equal);
        assert_eq!(compare(&int(-3), &int(7)).unwrap(), Ordering::Less);
        let padded = node(json!({"prim": "int"}), json!({"int": "007"}));
        assert!(equal(&padded, &int(7)).unwrap());
    }

    #[test]
    fn mismatched_primitives_fail() {
        let s = node(json!({"prim": "string"}), json!({"string": "5"}));
        let err = compare(&int(5), &s).unwrap_err();
        assert_eq!(
            err,
            AstError::NotComparable {
                left: "int at 0".to_string(),
                right: "string at 0".to_string()
            }
        );
    }

    #[test]
    fn or_left_before_right() {
        let ty = json!({"prim": "or", "args": [{"prim": "int"}, {"prim": "int"}]});
        let left = node(ty.clone(), json!({"prim": "Left", "args": [{"int": "100"}]}));
        let right = node(ty, json!({"prim": "Right", "args": [{"int": "1"}]}));
        assert_eq!(compare(&left, &right).unwrap(), Ordering::Less);
        assert_eq!(compare(&right, &left).unwrap(), Ordering::Greater);
    }

    #[test]
    fn option_none_first() {
        let ty = json!({"prim": "option", "args": [{"prim": "nat"}]});
        let none = node(ty.clone(), json!({"prim": "None"}));
        let some = node(ty, json!({"prim": "Some", "args": [{"int": "0"}]}));
        assert_eq!(compare(&none, &some).unwrap(), Ordering::Less);
    }

    #[test]
    fn pairs_left_to_right() {
        let ty = json!({"prim": "pair", "args": [{"prim": "nat"}, {"prim": "string"}]});
        let a = node(ty.clone(), json!({"prim": "Pair", "args": [{"int": "1"}, {"string": "z"}]}));
        let b = node(ty, json!({"prim": "Pair", "args": [{"int": "2"}, {"string": "a"}]}));
        assert_eq!(compare(&a, &b).unwrap(), Ordering::Less);
    }

    #[test]
    fn lists_prefix_first() {
        let ty = json!({"prim": "list", "args": [{"prim": "int"}]});
        let short = node(ty.clone(), json!([{"int": "1"}, {"int": "2"}]));
        let long = node(ty, json!([{"int": "1"}, {"int": "2"}, {"int": "0"}]));
        assert_eq!(compare(&short, &long).unwrap(), Ordering::Less);
    }

    #[test]
    fn bytes_lexicographic() {
        let a = node(json!({"prim": "bytes"}), json!({"bytes": "00ff"}));
        let b = node(json!({"prim": "bytes"}), json!({"bytes": "01"}));
        assert_eq!(compare(&a, &b).unwrap(), Ordering::Less);
    }

    fn b58check(prefix: &[u8], payload: &[u8]) -> String {
        let mut data = prefix.to_vec();
        data.extend_from_slice(payload);
        bs58::encode(data).with_check().into_string()
    }

    #[test]
    fn signatures_by_payload() {
        let ty = json!({"prim": "signature"});
        let edsig = node(ty.clone(), json!({"string": b58check(&[9, 245, 205, 134, 18], &[7; 64])}));
        let generic = node(ty.clone(), json!({"string": b58check(&[4, 130, 43], &[7; 64])}));
        let other = node(ty, json!({"string": b58check(&[13, 115, 101, 19, 63], &[8; 64])}));
        assert!(equal(&edsig, &generic).unwrap());
        assert_eq!(compare(&generic, &other).unwrap(), Ordering::Less);
    }

    #[test]
    fn big_map_pointers() {
        let ty = json!({"prim": "big_map", "args": [{"prim": "nat"}, {"prim": "nat"}]});
        let p1 = node(ty.clone(), json!({"int": "1"}));
        let p2 = node(ty.clone(), json!({"int": "2"}));
        let inline = node(ty, json!([]));
        assert_eq!(compare(&p1, &p2).unwrap(), Ordering::Less);
        assert_eq!(compare(&p2, &inline).unwrap(), Ordering::Less);
    }
}
