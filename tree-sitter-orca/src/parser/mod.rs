//! Parser entry point.

mod cursor;
mod rules;

use crate::error::{LanguageError, ParseError};
use crate::language::{ABI_VERSION, Language};
use crate::tree::Tree;
use cursor::State;
use tracing::debug;

/// Inputs larger than this are rejected unless the limit is raised.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

/// Deepest subblock nesting the parser builds. Rule recursion and tree depth
/// stay bounded by it whatever the input size.
pub const MAX_SUBBLOCK_DEPTH: usize = 64;

/// Whole-document parser for ORCA inputs.
///
/// Mirrors the usual tree-sitter flow: create, assign the language, parse.
///
/// ```
/// use tree_sitter_orca::{Parser, language};
///
/// let mut parser = Parser::new();
/// parser.set_language(language()).unwrap();
/// let tree = parser.parse("! B3LYP def2-SVP\n").unwrap();
/// assert_eq!(tree.root_node().to_sexp(), "(source_file (simple_line (arg) (arg)))");
/// ```
#[derive(Debug)]
pub struct Parser {
    language: Option<&'static Language>,
    max_input_bytes: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            language: None,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    /// Assign the grammar. Fails when the descriptor was built for another
    /// layout version.
    pub fn set_language(&mut self, language: &'static Language) -> Result<(), LanguageError> {
        if language.abi_version() != ABI_VERSION {
            return Err(LanguageError {
                found: language.abi_version(),
                expected: ABI_VERSION,
            });
        }
        self.language = Some(language);
        Ok(())
    }

    pub fn language(&self) -> Option<&'static Language> {
        self.language
    }

    pub fn set_max_input_bytes(&mut self, limit: usize) {
        self.max_input_bytes = limit;
    }

    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    /// Parse a complete document. Malformed content never fails the call; it
    /// shows up as `ERROR`/MISSING nodes (see [`Tree::has_error`]).
    #[tracing::instrument(level = "trace", skip_all, fields(bytes = text.len()))]
    pub fn parse(&mut self, text: &str) -> Result<Tree, ParseError> {
        if self.language.is_none() {
            return Err(ParseError::NoLanguage);
        }
        if text.len() > self.max_input_bytes {
            return Err(ParseError::InputTooLarge {
                size: text.len(),
                limit: self.max_input_bytes,
            });
        }

        let mut state = State::new(text);
        let root = state.source_file();
        let tree = state.nodes.finish(text.to_owned(), root);

        if tree.has_error() {
            debug!(errors = tree.error_nodes().len(), "parse recovered from errors");
        }
        Ok(tree)
    }
}
