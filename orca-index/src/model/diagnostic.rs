//! Syntax problems found while indexing.

use crate::model::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Text the grammar could not place (`ERROR` node).
    Unexpected,
    /// A required token the parser inserted (`MISSING` node).
    Missing,
}

/// One syntax problem, located in its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Repository-relative path of the document.
    pub file: String,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    /// Source lines around the problem.
    pub snippet: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file, self.span.start_line, self.span.start_column, self.message
        )
    }
}
