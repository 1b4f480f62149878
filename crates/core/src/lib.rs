//! bcd-core: typed Micheline value engine.
//!
//! Parses an untyped Micheline value against its type tree into a typed
//! node graph, then derives independent views of that graph:
//!
//! - [`compare()`] / [`equal()`] -- structural total order
//! - [`to_miguel()`] / [`diff()`] -- change-annotated presentation trees
//! - [`to_schema()`] / [`from_schema()`] -- JSON-Schema form descriptors
//! - [`encode_binary()`] / [`decode_binary()`] -- typed binary codec over
//!   the [`forge`] wire format
//! - [`try_unpack_string()`] -- speculative decoding of packed bytes
//! - [`collect_strings()`] -- search-index text
//!
//! Graphs are immutable once built and hold no shared state, so every
//! operation may run concurrently on independent inputs.

pub mod ast;
pub mod codec;
pub mod compare;
pub mod encoding;
pub mod error;
pub mod forge;
pub mod format;
pub mod miguel;
pub mod node;
pub mod parser;
pub mod schema;
pub mod strings;
pub mod unpack;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{Prim, TypeNode, ROOT_PATH};
pub use codec::{decode_binary, decode_binary_with, encode_binary};
pub use compare::{compare, equal, sort_by_node};
pub use error::AstError;
pub use miguel::{diff, diff_entries, to_miguel, DiffStatus, MiguelNode};
pub use node::{BigMapValue, Branch, Node, Value};
pub use schema::{from_schema, to_schema, type_to_schema, SchemaDescriptor};
pub use strings::collect_strings;
pub use unpack::{try_unpack_hex, try_unpack_string};

pub use bcd_interchange::Micheline;

/// Default bound on decoder nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Resource bounds applied when decoding untrusted binary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
