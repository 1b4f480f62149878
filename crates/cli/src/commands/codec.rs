use std::path::Path;

use bcd_core::format::to_michelson_inline;
use bcd_core::{decode_binary_with, encode_binary, try_unpack_hex};
use serde_json::json;

use crate::document::ValueDocument;
use crate::{Context, OutputFormat, Side};

pub(crate) fn cmd_pack(file: &Path, side: Side, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let bytes = match encode_binary(&doc.node(side, ctx)) {
        Ok(b) => b,
        Err(e) => ctx.fail(&format!("encode error: {}", e)),
    };
    let packed = hex::encode(bytes);
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&json!({ "packed": packed })),
        OutputFormat::Text => println!("{}", packed),
    }
}

pub(crate) fn cmd_unpack(file: &Path, text: &str, ctx: &Context) {
    let doc = ValueDocument::load(file, ctx);
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = match hex::decode(digits) {
        Ok(b) => b,
        Err(e) => ctx.fail(&format!("invalid hex: {}", e)),
    };
    let node = match decode_binary_with(&bytes, &doc.ty, ctx.config.limits()) {
        Ok(n) => n,
        Err(e) => ctx.fail(&format!("decode error: {}", e)),
    };
    let value = node.to_micheline();
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&value),
        OutputFormat::Text => println!("{}", to_michelson_inline(&value)),
    }
}

/// Exits with status 1 when the bytes are not a packed expression.
pub(crate) fn cmd_try_unpack(text: &str, ctx: &Context) {
    let Some(expr) = try_unpack_hex(text) else {
        ctx.fail("not a packed expression");
    };
    let inline = to_michelson_inline(&expr);
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&json!({
            "expression": expr,
            "michelson": inline,
        })),
        OutputFormat::Text => println!("{}", inline),
    }
}
