use std::sync::Arc;

use bcd_core::{diff, diff_entries, equal, sort_by_node, MiguelNode, Node, TypeNode, Value};
use bcd_interchange::BigMapDiffCell;

use crate::error::BigMapError;
use crate::prepare::{big_map_at, big_map_path, TypedCell};

/// Diff two big-map nodes by their pointer identifiers.
///
/// This is what [`bcd_core::diff`] does for a big map held by pointer; the
/// function only refuses nodes that are not big maps.
pub fn diff_by_identifier(previous: &Node, current: &Node) -> Result<MiguelNode, BigMapError> {
    for node in [previous, current] {
        if !matches!(node.value, Value::BigMap(_)) {
            return Err(BigMapError::NotABigMap {
                path: node.path().to_string(),
                prim: node.prim().to_string(),
            });
        }
    }
    Ok(diff(previous, current)?)
}

/// Diff the contents of a big map given two materialised cell sets.
///
/// `storage` is the contract storage type, `bin_path` the path of the big
/// map inside it and `ptr` the pointer whose cells are diffed; cells of other
/// big maps or other pointers are skipped. Each cell set is applied in order:
/// a later cell for the same key replaces an earlier one, and a removal cell
/// drops the key.
pub fn diff_by_content(
    previous: &[BigMapDiffCell],
    current: &[BigMapDiffCell],
    storage: &Arc<TypeNode>,
    bin_path: &str,
    ptr: i64,
) -> Result<MiguelNode, BigMapError> {
    let big_map = big_map_at(storage, bin_path)?;
    let prev = materialise(previous, storage, bin_path, ptr)?;
    let cur = materialise(current, storage, bin_path, ptr)?;
    tracing::debug!(
        path = bin_path,
        ptr,
        previous = prev.len(),
        current = cur.len(),
        "diffing big_map contents"
    );
    Ok(diff_entries(&big_map, &prev, &cur)?)
}

/// Pointer of the newest cell stored at `bin_path`.
pub fn latest_ptr(cells: &[BigMapDiffCell], bin_path: &str) -> Option<i64> {
    cells
        .iter()
        .filter(|c| big_map_path(c) == bin_path)
        .max_by_key(|c| c.level)
        .map(|c| c.ptr)
}

/// Live entries of a cell set, sorted by key.
fn materialise(
    cells: &[BigMapDiffCell],
    storage: &Arc<TypeNode>,
    bin_path: &str,
    ptr: i64,
) -> Result<Vec<(Node, Node)>, BigMapError> {
    let mut entries: Vec<(Node, Node)> = Vec::new();
    for cell in cells
        .iter()
        .filter(|c| c.ptr == ptr && big_map_path(c) == bin_path)
    {
        let TypedCell { key, value } = TypedCell::build(cell, storage)?;
        let mut existing = None;
        for (i, (k, _)) in entries.iter().enumerate() {
            if equal(k, &key)? {
                existing = Some(i);
                break;
            }
        }
        match (existing, value) {
            (Some(i), Some(value)) => entries[i].1 = value,
            (Some(i), None) => {
                entries.remove(i);
            }
            (None, Some(value)) => entries.push((key, value)),
            (None, None) => {}
        }
    }
    sort_by_node(&mut entries, |(k, _)| k)?;
    Ok(entries)
}
