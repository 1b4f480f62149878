use std::cmp::Ordering;
use std::path::Path;

use serde_json::json;

use crate::document::ValueDocument;
use crate::{Context, OutputFormat, Side};

pub(crate) fn cmd_compare(file: &Path, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let previous = doc.node(Side::Previous, ctx);
    let current = doc.node(Side::Value, ctx);

    let ordering = match bcd_core::compare(&previous, &current) {
        Ok(o) => o,
        Err(e) => ctx.fail(&format!("compare error: {}", e)),
    };
    let label = match ordering {
        Ordering::Less => "less",
        Ordering::Equal => "equal",
        Ordering::Greater => "greater",
    };

    match ctx.output {
        OutputFormat::Json => ctx.print_json(&json!({
            "ordering": label,
            "equal": ordering == Ordering::Equal,
        })),
        OutputFormat::Text => println!("{}", label),
    }
}
