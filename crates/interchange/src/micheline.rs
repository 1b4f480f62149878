//! The untyped Micheline expression tree.
//!
//! Both type trees (`{"prim": "pair", "args": [...]}`) and value trees
//! (`{"prim": "Pair", "args": [{"int": "1"}, {"string": "a"}]}`) share
//! this representation. Typing happens downstream in bcd-core.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::deserialize::InterchangeError;

/// A Micheline expression.
///
/// Integer literals keep their canonical decimal text and byte literals
/// keep lowercase hex, so the tree round-trips to JSON without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Micheline {
    Int(String),
    String(String),
    Bytes(String),
    Prim {
        prim: String,
        args: Vec<Micheline>,
        annots: Vec<String>,
    },
    Seq(Vec<Micheline>),
}

impl Micheline {
    pub fn int(value: impl ToString) -> Self {
        Micheline::Int(value.to_string())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Micheline::String(value.into())
    }

    /// Byte literal from raw bytes.
    pub fn bytes(value: &[u8]) -> Self {
        Micheline::Bytes(hex::encode(value))
    }

    pub fn prim(prim: impl Into<String>, args: Vec<Micheline>) -> Self {
        Micheline::Prim {
            prim: prim.into(),
            args,
            annots: Vec::new(),
        }
    }

    pub fn prim_annotated(
        prim: impl Into<String>,
        args: Vec<Micheline>,
        annots: Vec<String>,
    ) -> Self {
        Micheline::Prim {
            prim: prim.into(),
            args,
            annots,
        }
    }

    /// The primitive keyword, if this is a primitive application.
    pub fn prim_name(&self) -> Option<&str> {
        match self {
            Micheline::Prim { prim, .. } => Some(prim),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Micheline] {
        match self {
            Micheline::Prim { args, .. } => args,
            _ => &[],
        }
    }

    pub fn annots(&self) -> &[String] {
        match self {
            Micheline::Prim { annots, .. } => annots,
            _ => &[],
        }
    }

    /// Short name of the expression kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Micheline::Int(_) => "int",
            Micheline::String(_) => "string",
            Micheline::Bytes(_) => "bytes",
            Micheline::Prim { .. } => "prim",
            Micheline::Seq(_) => "sequence",
        }
    }

    /// Parse from JSON, validating literal payloads.
    pub fn from_json(v: &Value) -> Result<Micheline, InterchangeError> {
        parse_node(v, "$")
    }

    /// Render to canonical Micheline JSON. Empty `args`/`annots` are omitted.
    pub fn to_json(&self) -> Value {
        match self {
            Micheline::Int(i) => json!({ "int": i }),
            Micheline::String(s) => json!({ "string": s }),
            Micheline::Bytes(b) => json!({ "bytes": b }),
            Micheline::Prim { prim, args, annots } => {
                let mut obj = serde_json::Map::new();
                obj.insert("prim".to_string(), Value::String(prim.clone()));
                if !args.is_empty() {
                    obj.insert(
                        "args".to_string(),
                        Value::Array(args.iter().map(Micheline::to_json).collect()),
                    );
                }
                if !annots.is_empty() {
                    obj.insert(
                        "annots".to_string(),
                        Value::Array(annots.iter().cloned().map(Value::String).collect()),
                    );
                }
                Value::Object(obj)
            }
            Micheline::Seq(items) => Value::Array(items.iter().map(Micheline::to_json).collect()),
        }
    }

    /// Decoded byte payload of a byte literal.
    pub fn bytes_value(&self) -> Option<Vec<u8>> {
        match self {
            Micheline::Bytes(text) => hex::decode(text).ok(),
            _ => None,
        }
    }
}

impl Serialize for Micheline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Micheline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Micheline::from_json(&value).map_err(serde::de::Error::custom)
    }
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn parse_node(v: &Value, at: &str) -> Result<Micheline, InterchangeError> {
    match v {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(parse_node(item, &format!("{}[{}]", at, i))?);
            }
            Ok(Micheline::Seq(out))
        }
        Value::Object(obj) => {
            if let Some(i) = obj.get("int") {
                let text = i.as_str().ok_or_else(|| invalid(at, "'int' must be a string"))?;
                return canonical_int(text)
                    .map(Micheline::Int)
                    .ok_or_else(|| invalid(at, format!("invalid integer literal '{}'", text)));
            }
            if let Some(s) = obj.get("string") {
                let text = s
                    .as_str()
                    .ok_or_else(|| invalid(at, "'string' must be a string"))?;
                return Ok(Micheline::String(text.to_string()));
            }
            if let Some(b) = obj.get("bytes") {
                let text = b.as_str().ok_or_else(|| invalid(at, "'bytes' must be a string"))?;
                if hex::decode(text).is_err() {
                    return Err(invalid(at, format!("invalid hex in bytes literal '{}'", text)));
                }
                return Ok(Micheline::Bytes(text.to_ascii_lowercase()));
            }
            let prim = obj
                .get("prim")
                .and_then(|p| p.as_str())
                .ok_or_else(|| InterchangeError::MissingField {
                    field: format!("{}.prim", at),
                })?
                .to_string();

            let args = match obj.get("args") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(arr)) => {
                    let mut out = Vec::with_capacity(arr.len());
                    for (i, a) in arr.iter().enumerate() {
                        out.push(parse_node(a, &format!("{}.args[{}]", at, i))?);
                    }
                    out
                }
                Some(_) => return Err(invalid(at, "'args' must be an array")),
            };

            let annots = match obj.get("annots") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(arr)) => arr
                    .iter()
                    .map(|a| {
                        a.as_str()
                            .map(|s| s.to_string())
                            .ok_or_else(|| invalid(at, "annotations must be strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => return Err(invalid(at, "'annots' must be an array")),
            };

            Ok(Micheline::Prim { prim, args, annots })
        }
        other => Err(invalid(
            at,
            format!("expected object or array, got {}", json_kind(other)),
        )),
    }
}

fn invalid(at: &str, message: impl Into<String>) -> InterchangeError {
    InterchangeError::InvalidNode {
        at: at.to_string(),
        message: message.into(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strips a leading `+` and redundant zeros; rejects anything that is not
/// an optionally signed run of ASCII digits.
fn canonical_int(text: &str) -> Option<String> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some("0".to_string());
    }
    Some(if negative {
        format!("-{}", trimmed)
    } else {
        trimmed.to_string()
    })
}
