//! JSON-Schema bridge for form-driven value construction.
//!
//! A type tree becomes a JSON Schema whose properties are keyed by binary
//! path. Pairs flatten into their parent object and `unit` has no property.
//! Option and or values are objects discriminated by a `schemaKey` property:
//! `"none"`/`"some"` for options, the chosen branch's path for ors. Lists,
//! sets and maps are arrays of objects keyed the same way.
//!
//! [`from_schema`] walks the type tree and rebuilds Micheline from such a
//! form value, stopping at the first invalid leaf.

use bcd_interchange::Micheline;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};

use crate::ast::{Prim, TypeNode};
use crate::encoding;
use crate::error::AstError;
use crate::node::{BigMapValue, Branch, Node, Value};

/// Discriminator property of option and or form objects.
pub const SCHEMA_KEY: &str = "schemaKey";

const OPTION_NONE: &str = "none";
const OPTION_SOME: &str = "some";

const B58: &str = "[1-9A-HJ-NP-Za-km-z]";

/// A schema together with the form values of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub schema: Json,
    pub values: Json,
}

// ──────────────────────────────────────────────
// Type -> schema
// ──────────────────────────────────────────────

/// Root object schema for `ty`.
pub fn type_to_schema(ty: &TypeNode) -> Json {
    let mut schema = object_schema(ty);
    if let Json::Object(obj) = &mut schema {
        obj.insert("title".to_string(), json!(ty.display_name()));
    }
    schema
}

/// Object whose properties describe `ty` and everything flattened into it.
fn object_schema(ty: &TypeNode) -> Json {
    let mut props = Map::new();
    properties(ty, &mut props);
    object_from(props)
}

fn object_from(props: Map<String, Json>) -> Json {
    let required: Vec<Json> = props.keys().cloned().map(Json::String).collect();
    json!({
        "type": "object",
        "properties": props,
        "required": required,
    })
}

fn properties(ty: &TypeNode, props: &mut Map<String, Json>) {
    match ty.prim {
        Prim::Pair => ty.args.iter().for_each(|a| properties(a, props)),
        Prim::Unit => {}
        _ => {
            let mut schema = field_schema(ty);
            if let Json::Object(obj) = &mut schema {
                obj.insert("title".to_string(), json!(ty.display_name()));
            }
            props.insert(ty.path.clone(), schema);
        }
    }
}

fn discriminated(key: &str, title: &str, mut props: Map<String, Json>) -> Json {
    props.insert(SCHEMA_KEY.to_string(), json!({"type": "string", "const": key}));
    let mut schema = object_from(props);
    if let Json::Object(obj) = &mut schema {
        obj.insert("title".to_string(), json!(title));
    }
    schema
}

fn element_items(ty: &TypeNode) -> Json {
    let mut props = Map::new();
    ty.args.iter().for_each(|a| properties(a, &mut props));
    object_from(props)
}

fn field_schema(ty: &TypeNode) -> Json {
    match ty.prim {
        Prim::Int => json!({"type": "integer"}),
        Prim::Nat | Prim::Mutez => json!({"type": "integer", "minimum": 0}),
        Prim::Timestamp => json!({"type": "string", "format": "date-time"}),
        Prim::Bytes => json!({"type": "string", "pattern": "^([0-9a-fA-F]{2})*$"}),
        Prim::String => json!({"type": "string"}),
        Prim::Bool => json!({"type": "boolean"}),
        Prim::Address | Prim::Contract => json!({
            "type": "string",
            "pattern": format!("^(tz[1-4]|KT1|txr1|sr1){}+(%[^\\s%]+)?$", B58),
        }),
        Prim::KeyHash => json!({"type": "string", "pattern": format!("^tz[1-4]{}{{33}}$", B58)}),
        Prim::Key => json!({"type": "string", "pattern": format!("^(edpk|sppk|p2pk|BLpk){}+$", B58)}),
        Prim::Signature => json!({
            "type": "string",
            "pattern": format!("^(edsig|spsig1|p2sig|sig|BLsig){}+$", B58),
        }),
        Prim::ChainId => json!({"type": "string", "pattern": format!("^Net{}{{12}}$", B58)}),
        Prim::Lambda => json!({"type": "string"}),
        Prim::Never => json!({"not": {}}),
        Prim::Option => {
            let mut some = Map::new();
            ty.args.iter().for_each(|a| properties(a, &mut some));
            json!({
                "type": "object",
                "oneOf": [
                    discriminated(OPTION_NONE, "None", Map::new()),
                    discriminated(OPTION_SOME, "Some", some),
                ],
            })
        }
        Prim::Or => {
            let branches: Vec<Json> = ty
                .args
                .iter()
                .map(|branch| {
                    let mut props = Map::new();
                    properties(branch, &mut props);
                    discriminated(&branch.path, branch.display_name(), props)
                })
                .collect();
            json!({"type": "object", "oneOf": branches})
        }
        Prim::List | Prim::Set | Prim::Map => json!({"type": "array", "items": element_items(ty)}),
        Prim::BigMap => json!({
            "oneOf": [
                {"type": "integer", "minimum": 0, "title": "pointer"},
                {"type": "array", "items": element_items(ty)},
            ]
        }),
        Prim::Pair | Prim::Unit => object_schema(ty),
    }
}

// ──────────────────────────────────────────────
// Node -> form values
// ──────────────────────────────────────────────

/// Schema of the node's type and the form values of the node.
pub fn to_schema(node: &Node) -> SchemaDescriptor {
    let mut values = Map::new();
    form_values(node, &mut values);
    SchemaDescriptor {
        schema: type_to_schema(&node.ty),
        values: Json::Object(values),
    }
}

fn form_values(node: &Node, out: &mut Map<String, Json>) {
    let path = node.path().to_string();
    let value = match &node.value {
        Value::Pair(l, r) => {
            form_values(l, out);
            form_values(r, out);
            return;
        }
        Value::Unit => return,
        Value::Int(n) | Value::Nat(n) | Value::Mutez(n) => number(n),
        Value::Timestamp(secs) => match encoding::format_timestamp(secs) {
            Some(text) => json!(text),
            None => number(secs),
        },
        Value::Bytes(b) => json!(hex::encode(b)),
        Value::String(s)
        | Value::Address(s)
        | Value::Contract(s)
        | Value::KeyHash(s)
        | Value::Key(s)
        | Value::Signature(s)
        | Value::ChainId(s) => json!(s),
        Value::Bool(b) => json!(b),
        Value::Lambda(code) => json!(code.to_json().to_string()),
        Value::Option(inner) => {
            let mut obj = Map::new();
            match inner {
                Some(inner) => {
                    obj.insert(SCHEMA_KEY.to_string(), json!(OPTION_SOME));
                    form_values(inner, &mut obj);
                }
                None => {
                    obj.insert(SCHEMA_KEY.to_string(), json!(OPTION_NONE));
                }
            }
            Json::Object(obj)
        }
        Value::Or(_, inner) => {
            let mut obj = Map::new();
            obj.insert(SCHEMA_KEY.to_string(), json!(inner.path()));
            form_values(inner, &mut obj);
            Json::Object(obj)
        }
        Value::List(items) | Value::Set(items) => Json::Array(
            items
                .iter()
                .map(|item| {
                    let mut obj = Map::new();
                    form_values(item, &mut obj);
                    Json::Object(obj)
                })
                .collect(),
        ),
        Value::Map(entries) | Value::BigMap(BigMapValue::Inline(entries)) => Json::Array(
            entries
                .iter()
                .map(|(k, v)| {
                    let mut obj = Map::new();
                    form_values(k, &mut obj);
                    form_values(v, &mut obj);
                    Json::Object(obj)
                })
                .collect(),
        ),
        Value::BigMap(BigMapValue::Ptr(ptr)) => number(ptr),
    };
    out.insert(path, value);
}

/// JSON number when it fits, decimal string otherwise.
fn number(n: &BigInt) -> Json {
    match n.to_i64() {
        Some(i) => json!(i),
        None => json!(n.to_string()),
    }
}

// ──────────────────────────────────────────────
// Form values -> Micheline
// ──────────────────────────────────────────────

/// Rebuild a readable Micheline value of type `ty` from form values.
pub fn from_schema(values: &Json, ty: &TypeNode) -> Result<Micheline, AstError> {
    let obj = values
        .as_object()
        .ok_or_else(|| AstError::schema(&ty.path, "form values must be an object"))?;
    rebuild(ty, obj)
}

fn rebuild(ty: &TypeNode, obj: &Map<String, Json>) -> Result<Micheline, AstError> {
    match ty.prim {
        Prim::Pair => {
            let (left, right) = ty.arg2()?;
            Ok(Micheline::prim("Pair", vec![rebuild(left, obj)?, rebuild(right, obj)?]))
        }
        Prim::Unit => Ok(Micheline::prim("Unit", vec![])),
        _ => {
            let field = obj
                .get(&ty.path)
                .ok_or_else(|| AstError::schema(&ty.path, "missing value"))?;
            field_value(ty, field)
        }
    }
}

fn field_value(ty: &TypeNode, field: &Json) -> Result<Micheline, AstError> {
    let path = ty.path.as_str();
    match ty.prim {
        Prim::Int => integer(ty, field).map(Micheline::int),
        Prim::Nat => {
            let n = integer(ty, field)?;
            if n.sign() == Sign::Minus {
                return Err(AstError::schema(path, "nat must be non-negative"));
            }
            Ok(Micheline::int(n))
        }
        Prim::Mutez => {
            let n = integer(ty, field)?;
            if n.sign() == Sign::Minus || n > BigInt::from(i64::MAX) {
                return Err(AstError::schema(path, "mutez out of range"));
            }
            Ok(Micheline::int(n))
        }
        Prim::Timestamp => match field {
            Json::String(text) => encoding::parse_timestamp(text)
                .and_then(|secs| encoding::format_timestamp(&secs))
                .map(Micheline::String)
                .ok_or_else(|| AstError::schema(path, format!("invalid date-time '{}'", text))),
            Json::Number(_) => integer(ty, field).map(Micheline::int),
            _ => Err(AstError::schema(path, "expected a date-time string")),
        },
        Prim::Bytes => {
            let text = string(ty, field)?;
            hex::decode(text)
                .map(|raw| Micheline::bytes(&raw))
                .map_err(|_| AstError::schema(path, "expected hex-encoded bytes"))
        }
        Prim::String => string(ty, field).map(Micheline::string),
        Prim::Bool => match field {
            Json::Bool(true) => Ok(Micheline::prim("True", vec![])),
            Json::Bool(false) => Ok(Micheline::prim("False", vec![])),
            _ => Err(AstError::schema(path, "expected a boolean")),
        },
        Prim::Address | Prim::Contract => validated(ty, field, encoding::is_address),
        Prim::KeyHash => validated(ty, field, encoding::is_key_hash),
        Prim::Key => validated(ty, field, encoding::is_key),
        Prim::Signature => validated(ty, field, encoding::is_signature),
        Prim::ChainId => validated(ty, field, encoding::is_chain_id),
        Prim::Lambda => {
            let text = string(ty, field)?;
            let code: Json = serde_json::from_str(text)
                .map_err(|e| AstError::schema(path, format!("lambda is not JSON: {}", e)))?;
            Micheline::from_json(&code).map_err(|e| AstError::schema(path, e.to_string()))
        }
        Prim::Never => Err(AstError::schema(path, "type never has no values")),
        Prim::Option => {
            let obj = form_object(ty, field)?;
            match discriminator(ty, obj)? {
                OPTION_NONE => Ok(Micheline::prim("None", vec![])),
                OPTION_SOME => Ok(Micheline::prim("Some", vec![rebuild(ty.arg1()?, obj)?])),
                other => Err(AstError::schema(path, format!("unknown option key '{}'", other))),
            }
        }
        Prim::Or => {
            let obj = form_object(ty, field)?;
            let key = discriminator(ty, obj)?;
            let (left, right) = ty.arg2()?;
            let (branch, branch_ty) = if key == left.path {
                (Branch::Left, left)
            } else if key == right.path {
                (Branch::Right, right)
            } else {
                return Err(AstError::schema(path, format!("unknown branch '{}'", key)));
            };
            Ok(Micheline::prim(branch.constructor(), vec![rebuild(branch_ty, obj)?]))
        }
        Prim::List | Prim::Set => {
            let elem = ty.arg1()?;
            array(ty, field)?
                .iter()
                .map(|item| rebuild(elem, form_object(ty, item)?))
                .collect::<Result<Vec<_>, _>>()
                .map(Micheline::Seq)
        }
        Prim::Map => entries(ty, field),
        Prim::BigMap => match field {
            Json::Array(_) => entries(ty, field),
            _ => integer(ty, field).map(Micheline::int),
        },
        Prim::Pair | Prim::Unit => rebuild(ty, form_object(ty, field)?),
    }
}

fn entries(ty: &TypeNode, field: &Json) -> Result<Micheline, AstError> {
    let (key_ty, value_ty) = ty.arg2()?;
    let mut elts = Vec::new();
    for item in array(ty, field)? {
        let obj = form_object(ty, item)?;
        elts.push(Micheline::prim(
            "Elt",
            vec![rebuild(key_ty, obj)?, rebuild(value_ty, obj)?],
        ));
    }
    Ok(Micheline::Seq(elts))
}

fn integer(ty: &TypeNode, field: &Json) -> Result<BigInt, AstError> {
    let parsed = match field {
        Json::Number(n) => n
            .as_i64()
            .map(BigInt::from)
            .or_else(|| n.as_u64().map(BigInt::from)),
        Json::String(s) => s.parse::<BigInt>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| AstError::schema(&ty.path, format!("expected an integer, got {}", field)))
}

fn string<'a>(ty: &TypeNode, field: &'a Json) -> Result<&'a str, AstError> {
    field
        .as_str()
        .ok_or_else(|| AstError::schema(&ty.path, format!("expected a string, got {}", field)))
}

fn validated(ty: &TypeNode, field: &Json, check: fn(&str) -> bool) -> Result<Micheline, AstError> {
    let text = string(ty, field)?;
    if !check(text) {
        return Err(AstError::schema(
            &ty.path,
            format!("'{}' is not a valid {}", text, ty.prim),
        ));
    }
    Ok(Micheline::string(text))
}

fn form_object<'a>(ty: &TypeNode, field: &'a Json) -> Result<&'a Map<String, Json>, AstError> {
    field
        .as_object()
        .ok_or_else(|| AstError::schema(&ty.path, "expected an object"))
}

fn array<'a>(ty: &TypeNode, field: &'a Json) -> Result<&'a Vec<Json>, AstError> {
    field
        .as_array()
        .ok_or_else(|| AstError::schema(&ty.path, "expected an array"))
}

fn discriminator<'a>(ty: &TypeNode, obj: &'a Map<String, Json>) -> Result<&'a str, AstError> {
    obj.get(SCHEMA_KEY)
        .and_then(Json::as_str)
        .ok_or_else(|| AstError::schema(&ty.path, format!("missing {}", SCHEMA_KEY)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::equal;

    fn node(ty: Json, value: Json) -> Node {
        Node::build_json(&ty, &value).unwrap()
    }

    fn assert_roundtrip(n: &Node) {
        let descriptor = to_schema(n);
        let rebuilt = from_schema(&descriptor.values, &n.ty).unwrap();
        let back = Node::build(&n.ty, &rebuilt).unwrap();
        assert!(equal(n, &back).unwrap(), "{} != {}", rebuilt.to_json(), n.to_micheline().to_json());
    }

    #[test]
    fn flattens_pairs_by_path() {
        let n = node(
            json!({"prim": "pair", "args": [
                {"prim": "nat", "annots": ["%count"]},
                {"prim": "pair", "args": [{"prim": "string", "annots": ["%label"]}, {"prim": "unit"}]}
            ]}),
            json!({"prim": "Pair", "args": [{"int": "3"}, {"string": "x"}, {"prim": "Unit"}]}),
        );
        let d = to_schema(&n);
        assert_eq!(d.values, json!({"0/0": 3, "0/1/0": "x"}));
        assert_eq!(d.schema["properties"]["0/0"]["title"], json!("count"));
        assert_eq!(d.schema["properties"]["0/0"]["minimum"], json!(0));
        assert_eq!(d.schema["properties"]["0/1/0"]["type"], json!("string"));
        assert!(d.schema["properties"].get("0/1/1").is_none());
        assert_roundtrip(&n);
    }

    #[test]
    fn option_and_or_discriminators() {
        let ty = json!({"prim": "pair", "args": [
            {"prim": "option", "args": [{"prim": "int"}]},
            {"prim": "or", "args": [{"prim": "bytes"}, {"prim": "bool"}]}
        ]});
        let n = node(
            ty.clone(),
            json!({"prim": "Pair", "args": [
                {"prim": "Some", "args": [{"int": "-4"}]},
                {"prim": "Right", "args": [{"prim": "True"}]}
            ]}),
        );
        let d = to_schema(&n);
        assert_eq!(
            d.values,
            json!({
                "0/0": {"schemaKey": "some", "0/0/o": -4},
                "0/1": {"schemaKey": "0/1/1", "0/1/1": true}
            })
        );
        assert_roundtrip(&n);
        assert_roundtrip(&node(
            ty,
            json!({"prim": "Pair", "args": [{"prim": "None"}, {"prim": "Left", "args": [{"bytes": "00"}]}]}),
        ));
    }

    #[test]
    fn collections_are_arrays_of_objects() {
        let n = node(
            json!({"prim": "map", "args": [
                {"prim": "string"},
                {"prim": "list", "args": [{"prim": "timestamp"}]}
            ]}),
            json!([{"prim": "Elt", "args": [{"string": "a"}, [{"int": "0"}]]}]),
        );
        let d = to_schema(&n);
        assert_eq!(
            d.values,
            json!({"0": [{"0/k": "a", "0/v": [{"0/v/l": "1970-01-01T00:00:00Z"}]}]})
        );
        assert_roundtrip(&n);
    }

    #[test]
    fn big_numbers_as_strings() {
        let n = node(json!({"prim": "int"}), json!({"int": "123456789012345678901234567890"}));
        assert_eq!(to_schema(&n).values, json!({"0": "123456789012345678901234567890"}));
        assert_roundtrip(&n);
    }

    #[test]
    fn lambda_and_big_map() {
        assert_roundtrip(&node(
            json!({"prim": "lambda", "args": [{"prim": "unit"}, {"prim": "unit"}]}),
            json!([{"prim": "DROP"}, {"prim": "UNIT"}]),
        ));
        assert_roundtrip(&node(
            json!({"prim": "big_map", "args": [{"prim": "nat"}, {"prim": "nat"}]}),
            json!({"int": "12"}),
        ));
    }

    #[test]
    fn fails_fast_on_first_invalid_leaf() {
        let ty = TypeNode::from_json(&json!({"prim": "pair", "args": [
            {"prim": "nat"}, {"prim": "address"}
        ]}))
        .unwrap();
        let err = from_schema(&json!({"0/0": -1, "0/1": "nope"}), &ty).unwrap_err();
        assert_eq!(
            err,
            AstError::SchemaValidation {
                path: "0/0".to_string(),
                reason: "nat must be non-negative".to_string()
            }
        );
        let err = from_schema(&json!({"0/0": 1, "0/1": "nope"}), &ty).unwrap_err();
        assert!(matches!(err, AstError::SchemaValidation { ref path, .. } if path == "0/1"));
        let err = from_schema(&json!({"0/0": 1}), &ty).unwrap_err();
        assert_eq!(
            err,
            AstError::SchemaValidation {
                path: "0/1".to_string(),
                reason: "missing value".to_string()
            }
        );
    }

    #[test]
    fn unknown_or_branch() {
        let ty = TypeNode::from_json(&json!({"prim": "or", "args": [{"prim": "int"}, {"prim": "int"}]})).unwrap();
        let err = from_schema(&json!({"0": {"schemaKey": "0/7"}}), &ty).unwrap_err();
        assert!(err.to_string().contains("unknown branch"));
    }
}
