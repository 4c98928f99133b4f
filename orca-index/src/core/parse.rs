//! Parsing and extraction layer.
//!
//! Reads each scanned file, parses it with the ORCA grammar and hands the tree
//! to the extractor.

use crate::{
    config::model::IndexConfig,
    core::{debug_ast, extract, fs_scan::ScannedFile},
    model::{diagnostic::Diagnostic, document::InputDocument},
};
use anyhow::{Context, Result};
use std::fs;
use tree_sitter_orca::{Parser, language};

/// Parse a single file and extract its document and diagnostics.
#[tracing::instrument(level = "debug", skip_all, fields(path = %file.rel_path))]
pub fn parse_and_extract(
    file: &ScannedFile,
    config: &IndexConfig,
) -> Result<(InputDocument, Vec<Diagnostic>)> {
    let text =
        fs::read_to_string(&file.path).with_context(|| format!("read {}", file.path.display()))?;

    let mut parser = Parser::new();
    parser.set_language(language())?;
    parser.set_max_input_bytes(config.limits.max_file_bytes);
    let tree = parser
        .parse(&text)
        .with_context(|| format!("parse {}", file.rel_path))?;

    debug_ast::maybe_debug_ast(&file.path, &tree);

    Ok(extract::extract_document(&file.rel_path, &tree, config))
}
