use bcd_interchange::InterchangeError;

/// Errors produced by the typed AST engine.
///
/// Speculative decoding never produces one of these; see
/// [`crate::unpack::try_unpack_string`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstError {
    /// A value does not match the primitive declared at `path`.
    #[error("malformed value at {path}: {reason}")]
    MalformedValue { path: String, reason: String },

    /// The type tree references a primitive the engine does not support.
    #[error("unknown primitive '{prim}' at {path}")]
    UnknownPrimitive { prim: String, path: String },

    /// The type tree itself is structurally wrong (e.g. `pair` with one argument).
    #[error("invalid type at {path}: {reason}")]
    InvalidType { path: String, reason: String },

    /// Compare or diff across nodes of different shape.
    #[error("not comparable: {left} vs {right}")]
    NotComparable { left: String, right: String },

    /// Binary input ended before a complete expression was read.
    #[error("truncated input at offset {offset}: {needed} more bytes needed")]
    TruncatedInput { offset: usize, needed: usize },

    /// Binary input carries a tag or opcode the grammar does not define.
    #[error("unknown tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { offset: usize, tag: u8 },

    /// A complete expression was read but input remains.
    #[error("{remaining} trailing bytes at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    /// Binary input nests deeper than the configured limit.
    #[error("expression nests deeper than {limit}")]
    NestingTooDeep { limit: usize },

    /// The first invalid leaf found while rebuilding a value from form input.
    #[error("schema validation failed at {path}: {reason}")]
    SchemaValidation { path: String, reason: String },

    /// A path designator does not address any node of the type tree.
    #[error("path '{path}' not found in type tree")]
    PathNotFound { path: String },

    #[error("{0}")]
    Interchange(#[from] InterchangeError),
}

impl AstError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        AstError::MalformedValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(path: &str, reason: impl Into<String>) -> Self {
        AstError::SchemaValidation {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_type(path: &str, reason: impl Into<String>) -> Self {
        AstError::InvalidType {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
