//! Regex tokens of the grammar.
//!
//! Every pattern is anchored at the cursor; the parser asks for a specific
//! terminal where the grammar allows it, so lexing is context-aware the same
//! way a generated tree-sitter lexer is.

use crate::language::NodeKind;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Terminal {
    Comment,
    Element,
    Word,
    String,
    QuotedString,
    Float,
    Integer,
    File,
    Arg,
}

const COUNT: usize = 9;

impl Terminal {
    const ALL: [Terminal; COUNT] = [
        Terminal::Comment,
        Terminal::Element,
        Terminal::Word,
        Terminal::String,
        Terminal::QuotedString,
        Terminal::Float,
        Terminal::Integer,
        Terminal::File,
        Terminal::Arg,
    ];

    pub(crate) fn kind(self) -> NodeKind {
        match self {
            Terminal::Comment => NodeKind::Comment,
            Terminal::Element => NodeKind::Element,
            Terminal::Word => NodeKind::Word,
            Terminal::String => NodeKind::String,
            Terminal::QuotedString => NodeKind::QuotedString,
            Terminal::Float => NodeKind::Float,
            Terminal::Integer => NodeKind::Integer,
            Terminal::File => NodeKind::File,
            Terminal::Arg => NodeKind::Arg,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Terminal::Comment => r"^#[^\n]*",
            // An element is a whole token: `Cl` but never the head of `Cl2`.
            Terminal::Element => r"^[A-Za-z]{1,2}\b",
            Terminal::Word => r"^[A-Za-z][A-Za-z0-9_]*",
            Terminal::String => r#"^[A-Za-z]+[A-Za-z0-9_\-"]*"#,
            Terminal::QuotedString => r#"^"[A-Za-z0-9_\-.]*""#,
            Terminal::Float => r"^-?[0-9]+(\.[0-9]+)?(e-?[0-9]+)?",
            Terminal::Integer => r"^[0-9\-]+",
            Terminal::File => r"^[A-Za-z0-9.]+",
            Terminal::Arg => r"^[A-Za-z0-9\-()]+",
        }
    }

    fn regex(self) -> &'static Regex {
        static CELLS: [OnceLock<Regex>; COUNT] = [const { OnceLock::new() }; COUNT];
        let idx = Self::ALL
            .iter()
            .position(|t| *t == self)
            .unwrap_or_default();
        CELLS[idx].get_or_init(|| Regex::new(self.pattern()).expect("terminal pattern compiles"))
    }

    /// Length of the match at the start of `rest`, if any (empty matches do
    /// not count).
    pub(crate) fn match_len(self, rest: &str) -> Option<usize> {
        self.regex()
            .find(rest)
            .map(|m| m.end())
            .filter(|len| *len > 0)
    }
}

/// Whether `rest` starts with the keyword `kw` as a whole word.
pub(crate) fn keyword_len(rest: &str, kw: &str) -> Option<usize> {
    if !rest.starts_with(kw) {
        return None;
    }
    let boundary = rest[kw.len()..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'));
    boundary.then_some(kw.len())
}
