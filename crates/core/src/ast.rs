//! Type trees.
//!
//! A [`TypeNode`] is the typed view of a Micheline type expression such as
//! `{"prim": "pair", "args": [{"prim": "nat"}, {"prim": "string"}]}`.
//! Every node carries its binary path, the stable positional address used to
//! correlate nodes across separately parsed type and value trees.

use bcd_interchange::Micheline;
use std::fmt;
use std::sync::Arc;

use crate::error::AstError;

/// Path of the root of every type tree.
pub const ROOT_PATH: &str = "0";

// ──────────────────────────────────────────────
// Primitives
// ──────────────────────────────────────────────

/// Type primitives supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prim {
    Int,
    Nat,
    Mutez,
    Timestamp,
    Bytes,
    String,
    Bool,
    Unit,
    Address,
    Contract,
    KeyHash,
    Key,
    Signature,
    ChainId,
    Never,
    Pair,
    Or,
    Option,
    List,
    Set,
    Map,
    BigMap,
    Lambda,
}

impl Prim {
    pub fn from_keyword(keyword: &str) -> Option<Prim> {
        let prim = match keyword {
            "int" => Prim::Int,
            "nat" => Prim::Nat,
            "mutez" => Prim::Mutez,
            "timestamp" => Prim::Timestamp,
            "bytes" => Prim::Bytes,
            "string" => Prim::String,
            "bool" => Prim::Bool,
            "unit" => Prim::Unit,
            "address" => Prim::Address,
            "contract" => Prim::Contract,
            "key_hash" => Prim::KeyHash,
            "key" => Prim::Key,
            "signature" => Prim::Signature,
            "chain_id" => Prim::ChainId,
            "never" => Prim::Never,
            "pair" => Prim::Pair,
            "or" => Prim::Or,
            "option" => Prim::Option,
            "list" => Prim::List,
            "set" => Prim::Set,
            "map" => Prim::Map,
            "big_map" => Prim::BigMap,
            "lambda" => Prim::Lambda,
            _ => return None,
        };
        Some(prim)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Prim::Int => "int",
            Prim::Nat => "nat",
            Prim::Mutez => "mutez",
            Prim::Timestamp => "timestamp",
            Prim::Bytes => "bytes",
            Prim::String => "string",
            Prim::Bool => "bool",
            Prim::Unit => "unit",
            Prim::Address => "address",
            Prim::Contract => "contract",
            Prim::KeyHash => "key_hash",
            Prim::Key => "key",
            Prim::Signature => "signature",
            Prim::ChainId => "chain_id",
            Prim::Never => "never",
            Prim::Pair => "pair",
            Prim::Or => "or",
            Prim::Option => "option",
            Prim::List => "list",
            Prim::Set => "set",
            Prim::Map => "map",
            Prim::BigMap => "big_map",
            Prim::Lambda => "lambda",
        }
    }

    /// Number of type arguments. `pair` accepts more (right comb) and is
    /// normalised to two during parsing.
    pub fn arity(self) -> usize {
        match self {
            Prim::Pair | Prim::Or | Prim::Map | Prim::BigMap | Prim::Lambda => 2,
            Prim::Option | Prim::List | Prim::Set | Prim::Contract => 1,
            _ => 0,
        }
    }

    /// Path segment appended for the `index`-th argument.
    fn child_segment(self, index: usize) -> &'static str {
        match (self, index) {
            (Prim::Option, _) => "o",
            (Prim::List, _) => "l",
            (Prim::Set, _) => "s",
            (Prim::Map | Prim::BigMap, 0) => "k",
            (Prim::Map | Prim::BigMap, _) => "v",
            (_, 0) => "0",
            _ => "1",
        }
    }
}

impl fmt::Display for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ──────────────────────────────────────────────
// Type nodes
// ──────────────────────────────────────────────

/// A node of a type tree. Children are shared through `Arc` so that value
/// nodes can point at their type without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub prim: Prim,
    pub annots: Vec<String>,
    pub path: String,
    pub depth: usize,
    pub args: Vec<Arc<TypeNode>>,
}

impl TypeNode {
    /// Parse a type tree. The root gets path [`ROOT_PATH`].
    pub fn from_micheline(m: &Micheline) -> Result<Arc<TypeNode>, AstError> {
        build(m, ROOT_PATH, 0)
    }

    pub fn from_json(v: &serde_json::Value) -> Result<Arc<TypeNode>, AstError> {
        let m = Micheline::from_json(v)?;
        TypeNode::from_micheline(&m)
    }

    /// Field annotation without its `%` sigil.
    pub fn field_name(&self) -> Option<&str> {
        self.annot_with('%')
    }

    /// Type annotation without its `:` sigil.
    pub fn type_name(&self) -> Option<&str> {
        self.annot_with(':')
    }

    fn annot_with(&self, sigil: char) -> Option<&str> {
        self.annots
            .iter()
            .find_map(|a| a.strip_prefix(sigil))
            .filter(|name| !name.is_empty())
    }

    /// Name from annotations, field name first.
    pub fn annotated_name(&self) -> Option<&str> {
        self.field_name().or_else(|| self.type_name())
    }

    /// Display name: annotated name, falling back to the primitive keyword.
    pub fn display_name(&self) -> &str {
        self.annotated_name().unwrap_or(self.prim.keyword())
    }

    /// The single argument of `option`, `list`, `set` or `contract`.
    pub fn arg1(&self) -> Result<&Arc<TypeNode>, AstError> {
        match self.args.as_slice() {
            [inner] => Ok(inner),
            _ => Err(AstError::invalid_type(
                &self.path,
                format!("{} expects 1 argument", self.prim),
            )),
        }
    }

    /// Both arguments of `pair`, `or`, `map`, `big_map` or `lambda`.
    pub fn arg2(&self) -> Result<(&Arc<TypeNode>, &Arc<TypeNode>), AstError> {
        match self.args.as_slice() {
            [left, right] => Ok((left, right)),
            _ => Err(AstError::invalid_type(
                &self.path,
                format!("{} expects 2 arguments", self.prim),
            )),
        }
    }

    /// Locate the type node at `path`.
    pub fn find_by_path(self: &Arc<Self>, path: &str) -> Option<Arc<TypeNode>> {
        if self.path == path {
            return Some(Arc::clone(self));
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.args.iter().find_map(|a| a.find_by_path(path))
    }

    /// First node in pre-order whose annotated name is `name`.
    pub fn find_by_name(self: &Arc<Self>, name: &str) -> Option<Arc<TypeNode>> {
        if self.annotated_name() == Some(name) {
            return Some(Arc::clone(self));
        }
        self.args.iter().find_map(|a| a.find_by_name(name))
    }

    /// Render back to a Micheline type expression. Comb pairs come back in
    /// their normalised binary form.
    pub fn to_micheline(&self) -> Micheline {
        Micheline::prim_annotated(
            self.prim.keyword(),
            self.args.iter().map(|a| a.to_micheline()).collect(),
            self.annots.clone(),
        )
    }
}

fn build(m: &Micheline, path: &str, depth: usize) -> Result<Arc<TypeNode>, AstError> {
    let (keyword, args, annots) = match m {
        Micheline::Prim { prim, args, annots } => (prim.as_str(), args, annots),
        other => {
            return Err(AstError::invalid_type(
                path,
                format!("expected a type primitive, got {}", other.kind()),
            ))
        }
    };

    let prim = Prim::from_keyword(keyword).ok_or_else(|| {
        tracing::debug!(prim = keyword, path, "unsupported type primitive");
        AstError::UnknownPrimitive {
            prim: keyword.to_string(),
            path: path.to_string(),
        }
    })?;

    if prim == Prim::Pair && args.len() > 2 {
        // pair a b c == pair a (pair b c)
        let rest = Micheline::prim("pair", args[1..].to_vec());
        let normalised = vec![args[0].clone(), rest];
        return build_with_args(prim, &normalised, annots, path, depth);
    }

    if args.len() != prim.arity() {
        return Err(AstError::invalid_type(
            path,
            format!(
                "{} expects {} arguments, got {}",
                prim,
                prim.arity(),
                args.len()
            ),
        ));
    }

    build_with_args(prim, args, annots, path, depth)
}

fn build_with_args(
    prim: Prim,
    args: &[Micheline],
    annots: &[String],
    path: &str,
    depth: usize,
) -> Result<Arc<TypeNode>, AstError> {
    let mut children = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let child_path = format!("{}/{}", path, prim.child_segment(i));
        children.push(build(arg, &child_path, depth + 1)?);
    }
    Ok(Arc::new(TypeNode {
        prim,
        annots: annots.to_vec(),
        path: path.to_string(),
        depth,
        args: children,
    }))
}
