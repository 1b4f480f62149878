use std::path::Path;

use bcd_bigmap::{diff_by_content, storage_type, Pipeline};

use crate::document::BigMapDocument;
use crate::render::render_tree;
use crate::{Context, OutputFormat};

pub(crate) fn cmd_bigmap_diff(file: &Path, ctx: &Context) {
    let doc = BigMapDocument::load(file, ctx);
    let Some(protocol) = doc.protocol() else {
        ctx.fail("document has no cells");
    };
    let storage = match storage_type(&doc.contract, protocol) {
        Ok(t) => t,
        Err(e) => ctx.fail(&e.to_string()),
    };
    let Some(ptr) = doc.ptr() else {
        ctx.fail(&format!("no cells at bin path {}", doc.bin_path));
    };
    let tree = match diff_by_content(&doc.previous, &doc.current, &storage, &doc.bin_path, ptr) {
        Ok(t) => t,
        Err(e) => ctx.fail(&format!("big_map diff error: {}", e)),
    };
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&tree),
        OutputFormat::Text => print!("{}", render_tree(&tree)),
    }
}

pub(crate) fn cmd_bigmap_cells(file: &Path, ctx: &Context) {
    let doc = BigMapDocument::load(file, ctx);
    let pipeline = Pipeline::standard();
    let mut processed = Vec::with_capacity(doc.current.len());
    for cell in &doc.current {
        let result = storage_type(&doc.contract, &cell.protocol)
            .and_then(|storage| pipeline.process(cell, &storage));
        match result {
            Ok(Some(p)) => processed.push(p),
            Ok(None) => {}
            Err(e) => ctx.fail(&format!("cell {} at level {}: {}", cell.key_hash, cell.level, e)),
        }
    }
    match ctx.output {
        OutputFormat::Json => ctx.print_json(&processed),
        OutputFormat::Text => {
            for p in &processed {
                println!("{}\t{}", p.handler, p.output);
            }
        }
    }
}
