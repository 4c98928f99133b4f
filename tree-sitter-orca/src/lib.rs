//! ORCA input grammar.
//!
//! Grammar descriptor, parser and syntax tree for input files of the ORCA
//! quantum chemistry package (`! keywords`, `%block ... end` sections and
//! `* xyz` geometry blocks).
//!
//! The descriptor is also exported under the C symbol `tree_sitter_orca` as
//! an opaque handle for native code that hands it back to this crate. The
//! handle is not loadable by the tree-sitter C runtime (see [`ffi`]).
//!
//! ```
//! let tree = tree_sitter_orca::parse("! Opt\n* xyzfile 0 1 water.xyz\n").unwrap();
//! assert!(!tree.has_error());
//! assert_eq!(tree.root_node().named_child_count(), 2);
//! ```

pub mod error;
pub mod ffi;
pub mod highlight;
pub mod language;
mod parser;
mod terminals;
pub mod tree;

pub use error::{Error, LanguageError, ParseError, Result};
pub use ffi::tree_sitter_orca;
pub use highlight::{Capture, HighlightSpan, highlight};
pub use language::{ABI_VERSION, Field, Language, NodeKind, language};
pub use parser::{DEFAULT_MAX_INPUT_BYTES, MAX_SUBBLOCK_DEPTH, Parser};
pub use tree::{Node, Point, SyntaxNode, Tree};

use std::path::Path;

/// Syntax highlighting captures for editors.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../queries/highlights.scm");

/// Parse `text` with a fresh parser.
pub fn parse(text: &str) -> std::result::Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(language()).map_err(|_| ParseError::NoLanguage)?;
    parser.parse(text)
}

/// Read and parse a file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Tree> {
    let text = std::fs::read_to_string(path)?;
    let mut parser = Parser::new();
    parser.set_language(language())?;
    Ok(parser.parse(&text)?)
}
