//! Property tests over generated (type, value) pairs.
//!
//! Types nest up to depth 5 and mix every primitive that has values; values
//! are generated to fit their type. Each property builds the node graph and
//! checks one engine invariant.

use bcd_core::{
    compare, decode_binary, diff, encode_binary, equal, forge, from_schema, to_schema,
    try_unpack_string, AstError, DiffStatus, Limits, Micheline, MiguelNode, Node,
};
use num_bigint::BigInt;
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use serde_json::{json, Value as Json};
use std::cmp::Ordering;

const MAX_DEPTH: usize = 5;

const ADDRESSES: &[&str] = &[
    "tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx",
    "tz1Ke2h7sDdakHJQh8WX4Z372du1KChsksyU",
    "KT18amZmM5W7qDWVt2pH6uj7sCEd3kbzLrHT",
];

const KEY_HASHES: &[&str] = &[
    "tz1KqTpEZ7Yob7QbPE4Hy4Wo8fHG8LhKxZSx",
    "tz1Ke2h7sDdakHJQh8WX4Z372du1KChsksyU",
];

/// Binary prefix and payload size of each public key family.
const KEY_FAMILIES: &[(&[u8], usize)] = &[
    (&[13, 15, 37, 217], 32),
    (&[3, 254, 226, 86], 33),
    (&[3, 178, 139, 127], 33),
    (&[6, 149, 135, 204], 48),
];

/// edsig, spsig1, p2sig, generic sig and BLsig.
const SIGNATURE_FAMILIES: &[(&[u8], usize)] = &[
    (&[9, 245, 205, 134, 18], 64),
    (&[13, 115, 101, 19, 63], 64),
    (&[54, 240, 44, 52], 64),
    (&[4, 130, 43], 64),
    (&[40, 171, 64, 207], 96),
];

const CHAIN_ID_PREFIX: &[u8] = &[87, 82, 0];

const LAMBDA_BODIES: &[&str] = &[
    "[]",
    r#"[{"prim": "DUP"}, {"prim": "ADD"}]"#,
    r#"[{"prim": "PUSH", "args": [{"prim": "int"}, {"int": "1"}]}, {"prim": "ADD"}]"#,
];

const SCALARS: &[&str] = &[
    "int", "nat", "mutez", "string", "bytes", "bool", "unit", "timestamp", "address", "key_hash",
    "key", "signature", "chain_id", "contract", "lambda",
];

const COMPARABLE: &[&str] = &[
    "int", "nat", "mutez", "string", "bytes", "bool", "timestamp", "address", "key_hash", "key",
    "signature", "chain_id",
];

// ──────────────────────────────────────────────
// Generators
// ──────────────────────────────────────────────

/// A type and two values of that type.
#[derive(Clone, Debug)]
struct Sample {
    ty: Json,
    a: Json,
    b: Json,
}

impl Arbitrary for Sample {
    fn arbitrary(g: &mut Gen) -> Self {
        let ty = gen_type(g, MAX_DEPTH);
        let a = gen_value(g, &ty);
        let b = gen_value(g, &ty);
        Sample { ty, a, b }
    }
}

fn pick<'a>(g: &mut Gen, choices: &[&'a str]) -> &'a str {
    choices[usize::arbitrary(g) % choices.len()]
}

/// base58check text of `prefix` followed by `len` random bytes.
fn b58check(g: &mut Gen, prefix: &[u8], len: usize) -> String {
    let mut data = prefix.to_vec();
    data.extend((0..len).map(|_| u8::arbitrary(g)));
    bs58::encode(data).with_check().into_string()
}

fn pick_family(g: &mut Gen, families: &[(&'static [u8], usize)]) -> (&'static [u8], usize) {
    families[usize::arbitrary(g) % families.len()]
}

fn scalar_type(prim: &str) -> Json {
    match prim {
        "contract" => json!({"prim": "contract", "args": [{"prim": "unit"}]}),
        "lambda" => json!({"prim": "lambda", "args": [{"prim": "int"}, {"prim": "int"}]}),
        other => json!({ "prim": other }),
    }
}

fn gen_type(g: &mut Gen, depth: usize) -> Json {
    let mut ty = if depth == 0 || u8::arbitrary(g) % 3 == 0 {
        scalar_type(pick(g, SCALARS))
    } else {
        let inner = |g: &mut Gen| gen_type(g, depth - 1);
        match u8::arbitrary(g) % 7 {
            0 => json!({"prim": "pair", "args": [inner(g), inner(g)]}),
            1 => json!({"prim": "or", "args": [inner(g), inner(g)]}),
            2 => json!({"prim": "option", "args": [inner(g)]}),
            3 => json!({"prim": "list", "args": [inner(g)]}),
            4 => json!({"prim": "set", "args": [{"prim": pick(g, COMPARABLE)}]}),
            5 => json!({"prim": "map", "args": [{"prim": pick(g, COMPARABLE)}, inner(g)]}),
            _ => json!({"prim": "big_map", "args": [{"prim": pick(g, COMPARABLE)}, inner(g)]}),
        }
    };
    if bool::arbitrary(g) {
        ty["annots"] = json!([format!("%f{}", u8::arbitrary(g) % 8)]);
    }
    ty
}

fn gen_value(g: &mut Gen, ty: &Json) -> Json {
    let args = ty["args"].as_array().cloned().unwrap_or_default();
    match ty["prim"].as_str().unwrap() {
        "int" => json!({"int": i64::arbitrary(g).to_string()}),
        "nat" | "mutez" | "timestamp" => json!({"int": u32::arbitrary(g).to_string()}),
        "string" => json!({"string": String::arbitrary(g)}),
        "bytes" => {
            if u8::arbitrary(g) % 4 == 0 {
                // a packed unit, displayed as an expression
                json!({"bytes": "05030b"})
            } else {
                json!({"bytes": hex::encode(Vec::<u8>::arbitrary(g))})
            }
        }
        "bool" => json!({"prim": if bool::arbitrary(g) { "True" } else { "False" }}),
        "unit" => json!({"prim": "Unit"}),
        "address" => json!({"string": pick(g, ADDRESSES)}),
        "key_hash" => json!({"string": pick(g, KEY_HASHES)}),
        "key" => {
            let (prefix, len) = pick_family(g, KEY_FAMILIES);
            json!({"string": b58check(g, prefix, len)})
        }
        "signature" => {
            let (prefix, len) = pick_family(g, SIGNATURE_FAMILIES);
            json!({"string": b58check(g, prefix, len)})
        }
        "chain_id" => json!({"string": b58check(g, CHAIN_ID_PREFIX, 4)}),
        "contract" => {
            let address = pick(g, ADDRESSES);
            if bool::arbitrary(g) {
                json!({"string": format!("{}%transfer", address)})
            } else {
                json!({ "string": address })
            }
        }
        "lambda" => serde_json::from_str(pick(g, LAMBDA_BODIES)).unwrap(),
        "pair" => json!({"prim": "Pair", "args": [gen_value(g, &args[0]), gen_value(g, &args[1])]}),
        "or" => {
            if bool::arbitrary(g) {
                json!({"prim": "Left", "args": [gen_value(g, &args[0])]})
            } else {
                json!({"prim": "Right", "args": [gen_value(g, &args[1])]})
            }
        }
        "option" => {
            if bool::arbitrary(g) {
                json!({"prim": "None"})
            } else {
                json!({"prim": "Some", "args": [gen_value(g, &args[0])]})
            }
        }
        "list" | "set" => {
            let len = usize::arbitrary(g) % 4;
            Json::Array((0..len).map(|_| gen_value(g, &args[0])).collect())
        }
        "map" => {
            let len = usize::arbitrary(g) % 4;
            let mut keys: Vec<Json> = Vec::new();
            for _ in 0..len {
                let key = gen_value(g, &args[0]);
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            Json::Array(
                keys.into_iter()
                    .map(|k| json!({"prim": "Elt", "args": [k, gen_value(g, &args[1])]}))
                    .collect(),
            )
        }
        "big_map" => json!({"int": u16::arbitrary(g).to_string()}),
        other => panic!("generator does not cover {}", other),
    }
}

fn build(ty: &Json, value: &Json) -> Node {
    Node::build_json(ty, value).unwrap_or_else(|e| panic!("{}: {} against {}", e, value, ty))
}

fn quickcheck(prop: fn(Sample) -> TestResult) {
    QuickCheck::new().tests(300).max_tests(1000).quickcheck(prop);
}

// ──────────────────────────────────────────────
// Properties
// ──────────────────────────────────────────────

#[test]
fn binary_codec_roundtrip() {
    fn prop(s: Sample) -> TestResult {
        let node = build(&s.ty, &s.a);
        let bytes = encode_binary(&node).unwrap();
        let back = decode_binary(&bytes, &node.ty).unwrap();
        TestResult::from_bool(equal(&node, &back).unwrap())
    }
    quickcheck(prop);
}

#[test]
fn schema_roundtrip() {
    fn prop(s: Sample) -> TestResult {
        let node = build(&s.ty, &s.a);
        let descriptor = to_schema(&node);
        let rebuilt = from_schema(&descriptor.values, &node.ty).unwrap();
        let back = Node::build(&node.ty, &rebuilt).unwrap();
        TestResult::from_bool(equal(&node, &back).unwrap())
    }
    quickcheck(prop);
}

#[test]
fn comparator_is_a_total_order() {
    fn prop(s: Sample) -> TestResult {
        let a = build(&s.ty, &s.a);
        let b = build(&s.ty, &s.b);
        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();
        TestResult::from_bool(
            ab == ba.reverse() && compare(&a, &a).unwrap() == Ordering::Equal,
        )
    }
    quickcheck(prop);
}

#[test]
fn diff_with_self_is_unchanged() {
    fn prop(s: Sample) -> TestResult {
        let node = build(&s.ty, &s.a);
        let tree = diff(&node, &node).unwrap();
        TestResult::from_bool(
            tree.descendants()
                .iter()
                .all(|n| n.status == DiffStatus::Unchanged),
        )
    }
    quickcheck(prop);
}

/// (type, path, name, child count, status) for every node, pre-order.
fn shape(tree: &MiguelNode) -> Vec<(String, String, Option<String>, usize, DiffStatus)> {
    tree.descendants()
        .iter()
        .map(|n| {
            (
                n.prim.clone(),
                n.path.clone(),
                n.name.clone(),
                n.children.len(),
                n.status,
            )
        })
        .collect()
}

fn mirrored(status: DiffStatus) -> DiffStatus {
    match status {
        DiffStatus::Added => DiffStatus::Removed,
        DiffStatus::Removed => DiffStatus::Added,
        other => other,
    }
}

#[test]
fn diff_is_structurally_symmetric() {
    fn prop(s: Sample) -> TestResult {
        let a = build(&s.ty, &s.a);
        let b = build(&s.ty, &s.b);
        let forward = shape(&diff(&a, &b).unwrap());
        let backward: Vec<_> = shape(&diff(&b, &a).unwrap())
            .into_iter()
            .map(|(t, p, n, c, st)| (t, p, n, c, mirrored(st)))
            .collect();
        TestResult::from_bool(forward == backward)
    }
    quickcheck(prop);
}

#[test]
fn zarith_roundtrip_for_wide_integers() {
    fn prop(hi: i64, lo: u64) -> TestResult {
        let wide = BigInt::from(hi) * BigInt::from(10u64).pow(20) + BigInt::from(lo);
        let expr = Micheline::int(wide);
        let bytes = forge::forge(&expr).unwrap();
        TestResult::from_bool(forge::unforge(&bytes, Limits::default()).unwrap() == expr)
    }
    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(i64, u64) -> TestResult);
}

#[test]
fn decoder_never_panics_on_noise() {
    fn prop(bytes: Vec<u8>) -> TestResult {
        let _ = forge::unforge(&bytes, Limits::default());
        let mut packed = vec![forge::PACK_PREFIX];
        packed.extend_from_slice(&bytes);
        let _ = try_unpack_string(&packed);
        TestResult::passed()
    }
    QuickCheck::new()
        .tests(1000)
        .quickcheck(prop as fn(Vec<u8>) -> TestResult);
}

// ──────────────────────────────────────────────
// Scenarios
// ──────────────────────────────────────────────

#[test]
fn int_five_against_five_and_seven() {
    let ty = json!({"prim": "int"});
    let five = build(&ty, &json!({"int": "5"}));
    let seven = build(&ty, &json!({"int": "7"}));
    assert_eq!(diff(&five, &five).unwrap().status, DiffStatus::Unchanged);
    assert_eq!(diff(&five, &seven).unwrap().status, DiffStatus::Updated);
}

#[test]
fn option_none_against_some_three() {
    let ty = json!({"prim": "option", "args": [{"prim": "int"}]});
    let none = build(&ty, &json!({"prim": "None"}));
    let some = build(&ty, &json!({"prim": "Some", "args": [{"int": "3"}]}));
    let tree = diff(&none, &some).unwrap();
    assert_eq!(tree.status, DiffStatus::Added);
    assert_eq!(tree.value, Some(json!("3")));
}

#[test]
fn packed_unit_bytes_unpack() {
    assert_eq!(
        try_unpack_string(&[0x05, 0x03, 0x0b]),
        Some(Micheline::prim("Unit", vec![]))
    );
    assert_eq!(try_unpack_string(&[0xff]), None);
}

#[test]
fn list_grown_by_one() {
    let ty = json!({"prim": "list", "args": [{"prim": "int"}]});
    let short = build(&ty, &json!([{"int": "1"}, {"int": "2"}, {"int": "3"}]));
    let long = build(&ty, &json!([{"int": "1"}, {"int": "2"}, {"int": "3"}, {"int": "4"}]));
    let tree = diff(&short, &long).unwrap();
    let statuses: Vec<_> = tree.children.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            DiffStatus::Unchanged,
            DiffStatus::Unchanged,
            DiffStatus::Unchanged,
            DiffStatus::Added
        ]
    );
}

#[test]
fn truncated_string_fails_cleanly() {
    let ty = bcd_core::TypeNode::from_json(&json!({"prim": "string"})).unwrap();
    // packed string claiming 10 bytes, carrying 3
    let bytes = hex::decode("05010000000a616263").unwrap();
    assert_eq!(
        decode_binary(&bytes, &ty).unwrap_err(),
        AstError::TruncatedInput { offset: 6, needed: 7 }
    );
}
