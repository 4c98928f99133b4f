//! Parse state: input cursor, extras handling and transactional token helpers.
//!
//! Every token helper either consumes the token (plus the whitespace and
//! comments before it) or leaves the state untouched. Rules compose them
//! inside [`State::attempt`], which rewinds both the cursor and the node arena
//! when the rule does not match.

use crate::language::{Field, NodeKind};
use crate::terminals::{Terminal, keyword_len};
use crate::tree::{Child, TreeBuilder};

/// Whether `\n` is whitespace or a significant token at the current point.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Newlines {
    Skip,
    Stop,
}

/// Whitespace other than the line terminator. Matches the `\s` extra.
fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Checkpoint {
    pos: usize,
    nodes: usize,
}

pub(crate) struct State<'s> {
    pub(crate) src: &'s str,
    pub(crate) pos: usize,
    pub(crate) nodes: TreeBuilder,
    /// Number of subblocks currently open.
    pub(crate) depth: usize,
}

impl<'s> State<'s> {
    pub(crate) fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            nodes: TreeBuilder::default(),
            depth: 0,
        }
    }

    pub(crate) fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            nodes: self.nodes.len(),
        }
    }

    pub(crate) fn rewind(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.nodes.truncate(cp.nodes);
    }

    /// Run `rule`; on `None` restore the state as it was before the call.
    pub(crate) fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let cp = self.checkpoint();
        let out = rule(self);
        if out.is_none() {
            self.rewind(cp);
        }
        out
    }

    /// Consume whitespace and comments; comments are appended to `extras`.
    pub(crate) fn skip(&mut self, extras: &mut Vec<Child>, newlines: Newlines) {
        while let Some(c) = self.peek() {
            if c == '\n' && newlines == Newlines::Stop {
                break;
            }
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if c == '#' {
                let len = Terminal::Comment.match_len(self.rest()).unwrap_or(1);
                let id = self
                    .nodes
                    .leaf(NodeKind::Comment, self.pos..self.pos + len);
                extras.push(Child::new(id));
                self.pos += len;
            } else {
                break;
            }
        }
    }

    /// Byte offset of the next token start, without consuming anything.
    pub(crate) fn lookahead(&self, newlines: Newlines) -> usize {
        let mut pos = self.pos;
        while let Some(c) = self.src[pos..].chars().next() {
            match c {
                '\n' if newlines == Newlines::Stop => break,
                '#' => pos += self.src[pos..].find('\n').unwrap_or(self.src.len() - pos),
                c if c.is_whitespace() => pos += c.len_utf8(),
                _ => break,
            }
        }
        pos
    }

    /// First character of the next token.
    pub(crate) fn peek_token(&self, newlines: Newlines) -> Option<char> {
        self.src[self.lookahead(newlines)..].chars().next()
    }

    /// Whether only blanks or a comment remain on the current line, or the
    /// next token is the `end` keyword.
    pub(crate) fn line_ends_here(&self) -> bool {
        let at = self.lookahead(Newlines::Stop);
        let rest = &self.src[at..];
        rest.is_empty() || rest.starts_with('\n') || keyword_len(rest, "end").is_some()
    }

    /// Whether the next token is a word directly followed (on the same line)
    /// by `next`.
    pub(crate) fn word_then(&self, newlines: Newlines, next: char) -> bool {
        let at = self.lookahead(newlines);
        let Some(len) = Terminal::Word.match_len(&self.src[at..]) else {
            return false;
        };
        self.src[at + len..]
            .trim_start_matches(is_blank)
            .starts_with(next)
    }

    /// Whether the next token is a word that ends its line (a subblock
    /// header).
    pub(crate) fn word_then_newline(&self) -> bool {
        let at = self.lookahead(Newlines::Skip);
        let Some(len) = Terminal::Word.match_len(&self.src[at..]) else {
            return false;
        };
        let tail = self.src[at + len..].trim_start_matches(is_blank);
        let tail = match Terminal::Comment.match_len(tail) {
            Some(c) => &tail[c..],
            None => tail,
        };
        tail.starts_with('\n')
    }

    pub(crate) fn at_keyword(&self, newlines: Newlines, kw: &str) -> bool {
        let at = self.lookahead(newlines);
        keyword_len(&self.src[at..], kw).is_some()
    }

    fn commit(&mut self, out: &mut Vec<Child>, extras: Vec<Child>, kind: NodeKind, len: usize, field: Option<Field>) -> u32 {
        out.extend(extras);
        let id = self.nodes.leaf(kind, self.pos..self.pos + len);
        self.pos += len;
        out.push(Child { id, field });
        id
    }

    /// Match a regex terminal at the next token position.
    pub(crate) fn tok(&mut self, out: &mut Vec<Child>, t: Terminal, newlines: Newlines) -> Option<u32> {
        self.tok_with(out, &[t], None, newlines)
    }

    pub(crate) fn tok_field(
        &mut self,
        out: &mut Vec<Child>,
        t: Terminal,
        field: Field,
        newlines: Newlines,
    ) -> Option<u32> {
        self.tok_with(out, &[t], Some(field), newlines)
    }

    /// Match the longest of several terminals; ties go to the earliest in
    /// `choices`.
    pub(crate) fn longest(&mut self, out: &mut Vec<Child>, choices: &[Terminal], newlines: Newlines) -> Option<u32> {
        self.tok_with(out, choices, None, newlines)
    }

    fn tok_with(
        &mut self,
        out: &mut Vec<Child>,
        choices: &[Terminal],
        field: Option<Field>,
        newlines: Newlines,
    ) -> Option<u32> {
        let cp = self.checkpoint();
        let mut extras = Vec::new();
        self.skip(&mut extras, newlines);
        let rest = self.rest();
        let mut best: Option<(Terminal, usize)> = None;
        for t in choices {
            if let Some(len) = t.match_len(rest) {
                if best.is_none_or(|(_, l)| len > l) {
                    best = Some((*t, len));
                }
            }
        }
        match best {
            Some((t, len)) => Some(self.commit(out, extras, t.kind(), len, field)),
            None => {
                self.rewind(cp);
                None
            }
        }
    }

    /// Match a punctuation literal such as `[` or `=`.
    pub(crate) fn punct(&mut self, out: &mut Vec<Child>, kind: NodeKind, newlines: Newlines) -> Option<u32> {
        let text = kind.as_str();
        self.literal(out, kind, newlines, |rest| rest.starts_with(text).then_some(text.len()))
    }

    /// Match a keyword literal (`end`, `xyz`, ...) as a whole word.
    pub(crate) fn keyword(&mut self, out: &mut Vec<Child>, kind: NodeKind, newlines: Newlines) -> Option<u32> {
        let text = kind.as_str();
        self.literal(out, kind, newlines, |rest| keyword_len(rest, text))
    }

    fn literal(
        &mut self,
        out: &mut Vec<Child>,
        kind: NodeKind,
        newlines: Newlines,
        matcher: impl Fn(&str) -> Option<usize>,
    ) -> Option<u32> {
        let cp = self.checkpoint();
        let mut extras = Vec::new();
        self.skip(&mut extras, newlines);
        match matcher(self.rest()) {
            Some(len) => Some(self.commit(out, extras, kind, len, None)),
            None => {
                self.rewind(cp);
                None
            }
        }
    }

    /// Line terminator. End of input also terminates a line but produces no
    /// node.
    pub(crate) fn newline(&mut self, out: &mut Vec<Child>) -> Option<()> {
        let cp = self.checkpoint();
        let mut extras = Vec::new();
        self.skip(&mut extras, Newlines::Stop);
        match self.peek() {
            Some('\n') => {
                self.commit(out, extras, NodeKind::Newline, 1, None);
                Some(())
            }
            None => {
                out.extend(extras);
                Some(())
            }
            Some(_) => {
                self.rewind(cp);
                None
            }
        }
    }

    /// Wrap the rest of the current line in an `ERROR` node. Always consumes
    /// at least one character when not at end of input.
    pub(crate) fn error_line(&mut self) -> u32 {
        let start = self.pos;
        let line_end = self.rest().find('\n').map_or(self.src.len(), |i| start + i);
        let mut end = start + self.src[start..line_end].trim_end().len();
        if end == start {
            end = start + self.peek().map_or(0, char::len_utf8);
        }
        self.pos = end;
        self.nodes.leaf(NodeKind::Error, start..end)
    }

    pub(crate) fn missing(&mut self, out: &mut Vec<Child>, kind: NodeKind) {
        let id = self.nodes.missing(kind, self.pos);
        out.push(Child::new(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_token_leaves_state_untouched() {
        let mut s = State::new("  # note\n  42");
        let mut out = Vec::new();
        assert!(s.tok(&mut out, Terminal::Word, Newlines::Skip).is_none());
        assert_eq!(s.pos, 0);
        assert_eq!(s.nodes.len(), 0);
        assert!(out.is_empty());

        let id = s.tok(&mut out, Terminal::Integer, Newlines::Skip).unwrap();
        assert_eq!(s.nodes.range_of(id), 11..13);
        // comment extra + integer
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn newline_mode_controls_skipping() {
        let mut s = State::new("  \n x");
        let mut out = Vec::new();
        assert!(s.tok(&mut out, Terminal::Word, Newlines::Stop).is_none());
        assert!(s.newline(&mut out).is_some());
        assert_eq!(s.pos, 3);
        assert!(s.tok(&mut out, Terminal::Word, Newlines::Stop).is_some());
        assert!(s.newline(&mut out).is_some(), "end of input ends the line");
    }

    #[test]
    fn longest_match_prefers_earlier_choice_on_ties() {
        let mut s = State::new("12 1.5");
        let mut out = Vec::new();
        let a = s
            .longest(&mut out, &[Terminal::Integer, Terminal::Float], Newlines::Skip)
            .unwrap();
        let b = s
            .longest(&mut out, &[Terminal::Integer, Terminal::Float], Newlines::Skip)
            .unwrap();
        let ranges: Vec<_> = [a, b].iter().map(|id| s.nodes.range_of(*id)).collect();
        assert_eq!(ranges, vec![0..2, 3..6]);
    }

    #[test]
    fn lookahead_helpers() {
        let s = State::new("  scf # block\n");
        assert!(s.word_then_newline());
        let s = State::new("print[p_mos] 1");
        assert!(s.word_then(Newlines::Skip, '['));
        let s = State::new("  1.0 # x\nnext");
        assert!(!s.line_ends_here());
        let s = State::new("   # x\nnext");
        assert!(s.line_ends_here());
        let s = State::new(" end");
        assert!(s.line_ends_here());
        assert!(s.at_keyword(Newlines::Skip, "end"));
    }

    #[test]
    fn error_line_stops_before_newline() {
        let mut s = State::new("@@ junk  \nnext");
        let id = s.error_line();
        assert_eq!(s.nodes.range_of(id), 0..7);
        assert_eq!(s.peek(), Some(' '));
    }
}
