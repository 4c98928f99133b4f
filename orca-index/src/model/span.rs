//! Source location model and helpers.
//!
//! `Span` stores line/column and byte ranges. Lines and columns are 1-based
//! (as reported to users), bytes are 0-based offsets into the original text.

use serde::{Deserialize, Serialize};
use tree_sitter_orca::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start line (1-based).
    pub start_line: usize,
    /// Start column (1-based, in bytes).
    pub start_column: usize,
    /// Inclusive end line (1-based).
    pub end_line: usize,
    /// Inclusive start byte (0-based).
    pub start_byte: usize,
    /// Exclusive end byte (0-based).
    pub end_byte: usize,
}

impl Span {
    /// Span of a syntax node.
    pub fn of(node: Node<'_>) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        // A node ending right after a newline ends on the previous line.
        let end_row = if end.column == 0 && end.row > start.row {
            end.row - 1
        } else {
            end.row
        };
        Self {
            start_line: start.row + 1,
            start_column: start.column + 1,
            end_line: end_row + 1,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }

    /// Lines spanned (1-based inclusive).
    pub fn line_count(&self) -> usize {
        if self.end_line >= self.start_line {
            self.end_line - self.start_line + 1
        } else {
            0
        }
    }

    /// Extract a snippet from `text` by byte offsets, with *safe* bounds.
    pub fn slice_text<'a>(&self, text: &'a str) -> &'a str {
        let len = text.len();
        let start = self.start_byte.min(len);
        let end = self.end_byte.min(len).max(start);
        text.get(start..end).unwrap_or_default()
    }

    /// Whole lines touched by the span, expanded by `context_lines` above and
    /// below. The trailing newline is dropped.
    pub fn lines_with_context(&self, text: &str, context_lines: usize) -> String {
        let first = self.start_line.saturating_sub(1 + context_lines);
        let take = self.line_count().max(1) + (self.start_line - 1 - first) + context_lines;
        text.lines()
            .skip(first)
            .take(take)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start_line: usize, end_line: usize) -> Span {
        Span {
            start_line,
            start_column: 1,
            end_line,
            start_byte: 0,
            end_byte: 0,
        }
    }

    #[test]
    fn context_is_clamped_to_the_text() {
        let text = "a\nb\nc\nd\n";
        assert_eq!(span(1, 1).lines_with_context(text, 1), "a\nb");
        assert_eq!(span(3, 3).lines_with_context(text, 1), "b\nc\nd");
        assert_eq!(span(2, 3).lines_with_context(text, 0), "b\nc");
        assert_eq!(span(4, 4).lines_with_context(text, 5), "a\nb\nc\nd");
    }

    #[test]
    fn node_spans_end_on_the_last_text_line() {
        let tree = tree_sitter_orca::parse("! Opt\n%pal nprocs 2 end\n").unwrap();
        let block = tree.root_node().named_child(1).unwrap();
        let s = Span::of(block);
        assert_eq!((s.start_line, s.start_column, s.end_line), (2, 1, 2));
        assert_eq!(s.slice_text(tree.source()), "%pal nprocs 2 end");
    }
}
