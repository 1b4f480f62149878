use std::sync::Arc;

use bcd_core::TypeNode;
use bcd_interchange::BigMapDiffCell;

use crate::error::BigMapError;

/// A consumer of big-map cells, registered in a [`crate::Pipeline`].
///
/// Handlers are asked in pipeline order whether they accept a cell's big
/// map; the first that accepts handles the cell and no other handler sees
/// it.
pub trait BigMapHandler: Send + Sync {
    /// Stable name, reported with the handler's output and its errors.
    fn name(&self) -> &'static str;

    /// Whether this handler processes cells of the big map typed `big_map`.
    fn accepts(&self, big_map: &TypeNode) -> bool;

    /// Process one cell. `storage` is the full contract storage type.
    fn handle(
        &self,
        cell: &BigMapDiffCell,
        storage: &Arc<TypeNode>,
    ) -> Result<serde_json::Value, BigMapError>;
}
