//! bcd-bigmap: big-map cells on top of the typed engine.
//!
//! Big maps are not carried inline in contract storage; their cells come
//! from a separate history store as [`BigMapDiffCell`] records. This crate
//! types those cells against the contract storage type, diffs cell sets,
//! and dispatches cells through an explicit, ordered handler pipeline.

mod diff;
mod error;
mod pipeline;
mod prepare;
mod traits;

pub use diff::{diff_by_content, diff_by_identifier, latest_ptr};
pub use error::BigMapError;
pub use pipeline::{MetadataHandler, Pipeline, PreparedCellHandler, Processed};
pub use prepare::{cell_strings, prepare_cell, storage_type, PreparedCell};
pub use traits::BigMapHandler;

pub use bcd_interchange::{BigMapDiffCell, ContractMetadata};
