//! Typed binary codec.
//!
//! Values travel in packed form: the optimized Micheline of the node,
//! forged, behind the `0x05` prefix. Decoding is driven by the expected
//! type; the wire carries no type information.

use std::sync::Arc;

use crate::ast::TypeNode;
use crate::error::AstError;
use crate::forge;
use crate::node::Node;
use crate::Limits;

pub fn encode_binary(node: &Node) -> Result<Vec<u8>, AstError> {
    forge::pack(&node.to_optimized_micheline()?)
}

pub fn decode_binary(bytes: &[u8], ty: &Arc<TypeNode>) -> Result<Node, AstError> {
    decode_binary_with(bytes, ty, Limits::default())
}

pub fn decode_binary_with(
    bytes: &[u8],
    ty: &Arc<TypeNode>,
    limits: Limits,
) -> Result<Node, AstError> {
    let expr = forge::unpack(bytes, limits)?;
    Node::build(ty, &expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::equal;
    use serde_json::json;

    fn roundtrip(ty: serde_json::Value, value: serde_json::Value) -> Vec<u8> {
        let node = Node::build_json(&ty, &value).unwrap();
        let bytes = encode_binary(&node).unwrap();
        let back = decode_binary(&bytes, &node.ty).unwrap();
        assert!(equal(&node, &back).unwrap(), "roundtrip changed {}", value);
        bytes
    }

    #[test]
    fn unit_packs_to_known_bytes() {
        assert_eq!(roundtrip(json!({"prim": "unit"}), json!({"prim": "Unit"})), vec![0x05, 0x03, 0x0b]);
    }

    #[test]
    fn optimized_forms_on_the_wire() {
        let bytes = roundtrip(
            json!({"prim": "address"}),
            json!({"string": "KT18amZmM5W7qDWVt2pH6uj7sCEd3kbzLrHT"}),
        );
        // 05 0a <len 22> 01 <20 zero bytes> 00
        assert_eq!(bytes.len(), 1 + 1 + 4 + 22);
        assert_eq!(bytes[6], 0x01);
        let ts = roundtrip(json!({"prim": "timestamp"}), json!({"string": "2021-01-01T00:00:00Z"}));
        assert_eq!(ts[1], 0x00);
    }

    #[test]
    fn curve_signatures_survive_the_wire() {
        let families: [&[u8]; 3] = [&[9, 245, 205, 134, 18], &[13, 115, 101, 19, 63], &[54, 240, 44, 52]];
        for prefix in families {
            let mut data = prefix.to_vec();
            data.extend_from_slice(&[7; 64]);
            let text = bs58::encode(data).with_check().into_string();
            let bytes = roundtrip(json!({"prim": "signature"}), json!({ "string": text }));
            // 05 0a <len 64> <payload>, no curve tag
            assert_eq!(bytes.len(), 1 + 1 + 4 + 64);
        }
    }

    #[test]
    fn compound_roundtrips() {
        roundtrip(
            json!({"prim": "pair", "args": [
                {"prim": "map", "args": [{"prim": "string"}, {"prim": "option", "args": [{"prim": "mutez"}]}]},
                {"prim": "or", "args": [{"prim": "set", "args": [{"prim": "nat"}]}, {"prim": "bytes"}]}
            ]}),
            json!({"prim": "Pair", "args": [
                [{"prim": "Elt", "args": [{"string": "a"}, {"prim": "Some", "args": [{"int": "5"}]}]},
                 {"prim": "Elt", "args": [{"string": "b"}, {"prim": "None"}]}],
                {"prim": "Left", "args": [[{"int": "1"}, {"int": "9"}]]}
            ]}),
        );
    }

    #[test]
    fn wrong_type_fails_decoding() {
        let node = Node::build_json(&json!({"prim": "int"}), &json!({"int": "5"})).unwrap();
        let bytes = encode_binary(&node).unwrap();
        let string_ty = TypeNode::from_json(&json!({"prim": "string"})).unwrap();
        assert!(matches!(
            decode_binary(&bytes, &string_ty),
            Err(AstError::MalformedValue { .. })
        ));
    }
}
