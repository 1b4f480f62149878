use std::path::Path;

use crate::document::ValueDocument;
use crate::render::render_tree;
use crate::{Context, OutputFormat, Side};

pub(crate) fn cmd_miguel(file: &Path, side: Side, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let tree = bcd_core::to_miguel(&doc.node(side, ctx));
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&tree),
        OutputFormat::Text => print!("{}", render_tree(&tree)),
    }
}
