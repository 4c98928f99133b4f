//! Syntax classification for editors.
//!
//! [`highlight`] applies the captures of `queries/highlights.scm` to a parsed
//! tree without a query engine: every token is classified from its own kind
//! and its parent's kind, which is all the patterns in that file look at.

use crate::language::NodeKind;
use crate::tree::{Node, Point, Tree};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Capture names used by `queries/highlights.scm`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Capture {
    #[serde(rename = "comment")]
    Comment,
    #[serde(rename = "keyword")]
    Keyword,
    #[serde(rename = "operator")]
    Operator,
    #[serde(rename = "punctuation.delimiter")]
    PunctuationDelimiter,
    #[serde(rename = "punctuation.bracket")]
    PunctuationBracket,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "property")]
    Property,
    #[serde(rename = "variable")]
    Variable,
    #[serde(rename = "constant")]
    Constant,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "type")]
    Type,
}

impl Capture {
    pub fn as_str(self) -> &'static str {
        match self {
            Capture::Comment => "comment",
            Capture::Keyword => "keyword",
            Capture::Operator => "operator",
            Capture::PunctuationDelimiter => "punctuation.delimiter",
            Capture::PunctuationBracket => "punctuation.bracket",
            Capture::Function => "function",
            Capture::Property => "property",
            Capture::Variable => "variable",
            Capture::Constant => "constant",
            Capture::Number => "number",
            Capture::String => "string",
            Capture::Type => "type",
        }
    }
}

impl Display for Capture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One highlighted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub capture: Capture,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start: Point,
    pub end: Point,
}

/// Classify every token of `tree` in document order. Tokens without a
/// capture (newlines, recovered `ERROR` text) are left out.
pub fn highlight(tree: &Tree) -> Vec<HighlightSpan> {
    tree.root_node()
        .descendants()
        .filter(|n| n.child_count() == 0 && !n.is_missing())
        .filter_map(|n| {
            classify(n).map(|capture| HighlightSpan {
                capture,
                start_byte: n.start_byte(),
                end_byte: n.end_byte(),
                start: n.start_position(),
                end: n.end_position(),
            })
        })
        .collect()
}

fn classify(node: Node<'_>) -> Option<Capture> {
    use NodeKind::*;
    let parent = node.parent().map(|p| p.node_kind());
    let capture = match node.node_kind() {
        Comment => Capture::Comment,
        End | Xyz | Int | Gzmt | Xyzfile | Gzmtfile => Capture::Keyword,
        Bang | Percent | Star | Equals => Capture::Operator,
        NodeKind::Comma | Semicolon => Capture::PunctuationDelimiter,
        LBracket | RBracket | LBrace | RBrace => Capture::PunctuationBracket,
        Arg => Capture::Function,
        Float | Integer => Capture::Number,
        NodeKind::String | QuotedString | File => Capture::String,
        Element => Capture::Type,
        Word => match parent? {
            InputTitle => Capture::Function,
            InputKey | Subblock => Capture::Property,
            Array if is_key_array(node) => Capture::Property,
            VariableName => Capture::Variable,
            ValueAtom => Capture::Constant,
            _ => return None,
        },
        _ => return None,
    };
    Some(capture)
}

fn is_key_array(word: Node<'_>) -> bool {
    word.parent()
        .and_then(|array| array.parent())
        .is_some_and(|p| p.node_kind() == NodeKind::InputKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parser, language};

    fn captures(text: &str) -> Vec<(String, &'static str)> {
        let mut parser = Parser::new();
        parser.set_language(language()).unwrap();
        let tree = parser.parse(text).unwrap();
        highlight(&tree)
            .into_iter()
            .map(|h| (text[h.start_byte..h.end_byte].to_string(), h.capture.as_str()))
            .collect()
    }

    #[test]
    fn block_tokens() {
        let got = captures("%scf MaxIter 150 end # done\n");
        assert_eq!(
            got,
            vec![
                ("%".to_string(), "operator"),
                ("scf".to_string(), "function"),
                ("MaxIter".to_string(), "property"),
                ("150".to_string(), "number"),
                ("end".to_string(), "keyword"),
                ("# done".to_string(), "comment"),
            ]
        );
    }

    #[test]
    fn geometry_tokens() {
        let got = captures("* xyzfile 0 1 water.xyz\n");
        let caps: Vec<&str> = got.iter().map(|(_, c)| *c).collect();
        assert_eq!(
            caps,
            vec!["operator", "keyword", "number", "number", "string"]
        );
    }

    fn owned(pairs: &[(&str, &'static str)]) -> Vec<(String, &'static str)> {
        pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    #[test]
    fn variables_and_value_words() {
        let got = captures("%paras\n  R = 1.0;\n  Basis def2-SVP\n  Functional B3LYP\nend\n");
        assert_eq!(
            got,
            owned(&[
                ("%", "operator"),
                ("paras", "function"),
                ("R", "variable"),
                ("=", "operator"),
                ("1.0", "number"),
                (";", "punctuation.delimiter"),
                ("Basis", "property"),
                ("def2-SVP", "string"),
                ("Functional", "property"),
                ("B3LYP", "constant"),
                ("end", "keyword"),
            ])
        );
    }

    #[test]
    fn array_keys_and_brace_values() {
        let got = captures("%output\n  print[p_mos] 1\nend\n%method\n  Rotate { 48, 49 }\nend\n");
        assert_eq!(
            got,
            owned(&[
                ("%", "operator"),
                ("output", "function"),
                ("print", "property"),
                ("[", "punctuation.bracket"),
                ("p_mos", "string"),
                ("]", "punctuation.bracket"),
                ("1", "number"),
                ("end", "keyword"),
                ("%", "operator"),
                ("method", "function"),
                ("Rotate", "property"),
                ("{", "punctuation.bracket"),
                ("48", "number"),
                (",", "punctuation.delimiter"),
                ("49", "number"),
                ("}", "punctuation.bracket"),
                ("end", "keyword"),
            ])
        );
    }

    #[test]
    fn elements_subblocks_and_variable_refs() {
        let got = captures("* xyz 0 1\nO 0.0 0.0 {R}\n*\n");
        assert_eq!(
            got,
            owned(&[
                ("*", "operator"),
                ("xyz", "keyword"),
                ("0", "number"),
                ("1", "number"),
                ("O", "type"),
                ("0.0", "number"),
                ("0.0", "number"),
                ("{", "punctuation.bracket"),
                ("R", "variable"),
                ("}", "punctuation.bracket"),
                ("*", "operator"),
            ])
        );

        let got = captures("%basis\n  NewGTO\n    S 1\n  end\nend\n");
        assert!(got.contains(&("NewGTO".to_string(), "property")));
        assert!(got.contains(&("S".to_string(), "property")));
    }

    #[test]
    fn query_file_mentions_every_capture() {
        for cap in [
            Capture::Comment,
            Capture::Keyword,
            Capture::Operator,
            Capture::PunctuationDelimiter,
            Capture::PunctuationBracket,
            Capture::Function,
            Capture::Property,
            Capture::Variable,
            Capture::Constant,
            Capture::Number,
            Capture::String,
            Capture::Type,
        ] {
            let tag = format!("@{}", cap.as_str());
            assert!(crate::HIGHLIGHTS_QUERY.contains(&tag), "{tag} not in query");
        }
    }
}
