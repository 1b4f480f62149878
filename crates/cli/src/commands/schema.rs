use std::path::Path;

use bcd_core::format::to_michelson_inline;
use bcd_core::{from_schema, to_schema, type_to_schema, Node, SchemaDescriptor};
use serde_json::json;

use crate::document::{read_json, ValueDocument};
use crate::{Context, OutputFormat, Side};

/// Descriptor of the document's value, or the bare type schema when the
/// document carries no value or `--type-only` is given.
pub(crate) fn cmd_schema(file: &Path, type_only: bool, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let descriptor = if type_only || !doc.has(Side::Value) {
        SchemaDescriptor {
            schema: type_to_schema(&doc.ty),
            values: json!({}),
        }
    } else {
        to_schema(&doc.node(Side::Value, ctx))
    };
    ctx.print_json(&descriptor);
}

pub(crate) fn cmd_from_schema(file: &Path, values_path: &Path, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let values = read_json(values_path, ctx);

    let value = match from_schema(&values, &doc.ty) {
        Ok(v) => v,
        Err(e) => ctx.fail(&e.to_string()),
    };
    if let Err(e) = Node::build(&doc.ty, &value) {
        ctx.fail(&format!("rebuilt value does not type: {}", e));
    }

    match ctx.output {
        OutputFormat::Json => ctx.print_json(&value),
        OutputFormat::Text => println!("{}", to_michelson_inline(&value)),
    }
}
