//! Text rendering of Miguel trees, one node per line:
//!
//! ```text
//! total_supply (nat) 1000 -> 1500 [updated]
//! metadata (map) [updated]
//!   name (bytes) "Ledger" [added]
//! ```

use bcd_core::{DiffStatus, MiguelNode};
use serde_json::Value as Json;

pub(crate) fn render_tree(root: &MiguelNode) -> String {
    let mut out = String::new();
    render(root, 0, &mut out);
    out
}

fn render(node: &MiguelNode, indent: usize, out: &mut String) {
    out.push_str(&"  ".repeat(indent));
    out.push_str(node.name.as_deref().unwrap_or(&node.path));
    out.push_str(" (");
    out.push_str(&node.prim);
    out.push(')');
    if let Some(value) = &node.value {
        out.push(' ');
        if let Some(from) = &node.from {
            out.push_str(&text(from));
            out.push_str(" -> ");
        }
        out.push_str(&text(value));
    }
    if let Some(status) = status_label(node.status) {
        out.push_str(" [");
        out.push_str(status);
        out.push(']');
    }
    out.push('\n');
    for child in &node.children {
        render(child, indent + 1, out);
    }
}

fn text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn status_label(status: DiffStatus) -> Option<&'static str> {
    match status {
        DiffStatus::Unchanged => None,
        DiffStatus::Added => Some("added"),
        DiffStatus::Removed => Some("removed"),
        DiffStatus::Updated => Some("updated"),
    }
}
