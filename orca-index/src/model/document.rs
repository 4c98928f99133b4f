//! Structured view of one ORCA input file.
//!
//! An [`InputDocument`] is what the extractor pulls out of a syntax tree:
//! the `!` keywords, every `%` section with its settings, variables and
//! nested subblocks, and all geometries. It is one line of
//! `documents.jsonl`.

use crate::model::{geometry::Atom, geometry::Geometry, span::Span};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDocument {
    /// Deterministic id derived from `path`.
    pub id: String,
    /// Repository-relative path with `/` separators.
    pub path: String,
    /// FNV-1a hash of the file contents.
    pub content_hash: String,
    pub bytes: usize,
    /// `!` keywords in order of appearance.
    pub keywords: Vec<String>,
    /// One-line `%name value` inputs.
    pub settings: Vec<Setting>,
    pub blocks: Vec<InputBlock>,
    pub geometries: Vec<Geometry>,
    /// Number of syntax problems found in the file.
    pub diagnostics: usize,
}

impl InputDocument {
    pub fn has_error(&self) -> bool {
        self.diagnostics > 0
    }

    /// First block named `name` (case-insensitive).
    pub fn block(&self, name: &str) -> Option<&InputBlock> {
        self.blocks
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Inline atoms of all geometries and coordinate subblocks.
    pub fn atom_count(&self) -> usize {
        let inline: usize = self.geometries.iter().map(Geometry::atom_count).sum();
        let nested: usize = self.blocks.iter().map(|b| b.body.atom_count()).sum();
        inline + nested
    }
}

/// A `key value` pair, or a one-line `%name value` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Key as written; array keys keep their index (`print[p_mos]`).
    pub key: String,
    /// Values in order; quoted strings keep their quotes.
    pub values: Vec<String>,
    pub line: usize,
}

/// A `%name ... end` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputBlock {
    pub name: String,
    #[serde(flatten)]
    pub body: Body,
    /// `false` when the closing `end` was missing.
    pub closed: bool,
    pub span: Span,
}

/// A nested `name ... end` section inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subblock {
    pub name: String,
    #[serde(flatten)]
    pub body: Body,
    pub closed: bool,
    pub line: usize,
}

/// Contents shared by blocks and subblocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub settings: Vec<Setting>,
    pub variables: Vec<Variable>,
    pub subblocks: Vec<Subblock>,
    /// Coordinate lines of a `coords` style subblock.
    pub atoms: Vec<Atom>,
    /// Raw `{ ... }` entries.
    pub raw: Vec<String>,
}

impl Body {
    pub fn setting(&self, key: &str) -> Option<&Setting> {
        self.settings
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(key))
    }

    pub fn subblock(&self, name: &str) -> Option<&Subblock> {
        self.subblocks
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn atom_count(&self) -> usize {
        self.atoms.len() + self.subblocks.iter().map(|s| s.body.atom_count()).sum::<usize>()
    }
}

/// A `%paras` style definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: VariableValue,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableValue {
    /// `name = 1.5`
    Scalar { value: f64 },
    /// `name = start, end, steps` scan.
    Range { start: f64, end: f64, steps: f64 },
    /// `name [a b c]`
    List { values: Vec<f64> },
}
