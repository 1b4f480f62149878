//! Search-index text.

use crate::miguel::display_text;
use crate::node::{Node, Value};

/// Display text of every leaf, in pre-order. `Unit` leaves carry no text
/// and are skipped.
pub fn collect_strings(node: &Node) -> Vec<String> {
    let mut out = Vec::new();
    collect(node, &mut out);
    out
}

fn collect(node: &Node, out: &mut Vec<String>) {
    if node.is_leaf() {
        if !matches!(node.value, Value::Unit) {
            out.extend(display_text(node));
        }
        return;
    }
    for child in node.children() {
        collect(child, out);
    }
}
