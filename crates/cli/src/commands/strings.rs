use std::path::Path;

use crate::document::ValueDocument;
use crate::{Context, OutputFormat, Side};

pub(crate) fn cmd_strings(file: &Path, side: Side, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let strings = bcd_core::collect_strings(&doc.node(side, ctx));
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&strings),
        OutputFormat::Text => {
            for s in &strings {
                println!("{}", s);
            }
        }
    }
}
