//! bcd-interchange: Micheline JSON model and shared records.
//!
//! Provides the untyped [`Micheline`] expression tree used for both type
//! trees and value trees, the primitive keyword table with its binary
//! opcodes, and the records exchanged with the big-map history store
//! and the contract metadata resolver.
//!
//! Every other bcd crate depends on this one for initial JSON parsing,
//! then builds its own typed representation on top.

pub mod deserialize;
pub mod micheline;
pub mod prim;
pub mod types;

pub use deserialize::{
    parse_big_map_diff, parse_big_map_diffs, parse_contract_metadata, InterchangeError,
};
pub use micheline::Micheline;
pub use types::*;
