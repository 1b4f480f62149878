use std::path::Path;

use bcd_core::DiffStatus;

use crate::document::ValueDocument;
use crate::render::render_tree;
use crate::{Context, OutputFormat, Side};

pub(crate) fn cmd_diff(file: &Path, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let previous = doc.node(Side::Previous, ctx);
    let current = doc.node(Side::Value, ctx);

    let tree = match bcd_core::diff(&previous, &current) {
        Ok(t) => t,
        Err(e) => ctx.fail(&format!("diff error: {}", e)),
    };

    match ctx.output {
        OutputFormat::Json => ctx.print_json(&tree),
        OutputFormat::Text => {
            print!("{}", render_tree(&tree));
            if !ctx.quiet {
                let changed = tree
                    .descendants()
                    .iter()
                    .filter(|n| n.children.is_empty() && n.status != DiffStatus::Unchanged)
                    .count();
                println!("{} change(s)", changed);
            }
        }
    }
}
