//! Grammar rules.
//!
//! One method per rule of the ORCA grammar. Rules return the id of the node
//! they built, or `None` without side effects when they do not match. Where
//! the grammar is ambiguous the choice is made with bounded lookahead:
//! a word alone on its line opens a subblock, a complete `name = number` or
//! `name [..]` line is a variable definition, anything else is a key/value
//! pair.
//!
//! Subblocks nest at most [`MAX_SUBBLOCK_DEPTH`] deep; a header line below
//! that depth is an `ERROR` line.

use super::MAX_SUBBLOCK_DEPTH;
use super::cursor::{Newlines, State};
use crate::language::{Field, NodeKind};
use crate::terminals::Terminal;
use crate::tree::Child;

use Newlines::{Skip, Stop};

/// Coordinate line flavours shared by geometry blocks and subblocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LineForm {
    Xyz,
    Internal,
    Zmatrix,
}

impl LineForm {
    const ALL: [LineForm; 3] = [LineForm::Xyz, LineForm::Internal, LineForm::Zmatrix];
}

impl State<'_> {
    pub(crate) fn source_file(&mut self) -> u32 {
        let mut ch = Vec::new();
        loop {
            self.skip(&mut ch, Skip);
            if self.at_eof() {
                break;
            }
            let item = match self.peek() {
                Some('!') => self.simple_line(),
                Some('%') => self.input_item(),
                Some('*') => self.geom_item(),
                _ => None,
            };
            let id = item.unwrap_or_else(|| self.error_line());
            ch.push(Child::new(id));
        }
        self.nodes
            .branch_spanning(NodeKind::SourceFile, ch, 0..self.src.len())
    }

    // simple_line: '!' arg* '\n'
    fn simple_line(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.punct(&mut ch, NodeKind::Bang, Skip)?;
            loop {
                if matches!(s.peek_token(Stop), None | Some('\n')) {
                    break;
                }
                if s.tok(&mut ch, Terminal::Arg, Stop).is_none() {
                    s.skip(&mut ch, Stop);
                    let err = s.error_line();
                    ch.push(Child::new(err));
                    break;
                }
            }
            s.newline(&mut ch)?;
            Some(s.nodes.branch(NodeKind::SimpleLine, ch, s.pos))
        })
    }

    // input_title: '%' word
    fn input_title(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.punct(&mut ch, NodeKind::Percent, Skip)?;
            s.tok(&mut ch, Terminal::Word, Stop)?;
            let id = s.nodes.branch(NodeKind::InputTitle, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // _input: input_line | input_block
    fn input_item(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.input_title(&mut ch)?;
            if let Some(line) = s.input_line_tail(&ch) {
                return Some(line);
            }
            Some(s.input_block_tail(ch))
        })
    }

    // input_line: input_title (quoted_string | float) '\n'
    fn input_line_tail(&mut self, title: &[Child]) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = title.to_vec();
            s.longest(&mut ch, &[Terminal::QuotedString, Terminal::Float], Stop)?;
            s.newline(&mut ch)?;
            Some(s.nodes.branch(NodeKind::InputLine, ch, s.pos))
        })
    }

    // input_block: input_title input_body? 'end'
    fn input_block_tail(&mut self, mut ch: Vec<Child>) -> u32 {
        self.input_body(&mut ch);
        self.block_end(&mut ch);
        self.nodes.branch(NodeKind::InputBlock, ch, self.pos)
    }

    /// Closing `end` of a block or subblock, inserted as MISSING when absent.
    fn block_end(&mut self, ch: &mut Vec<Child>) {
        if self.keyword(ch, NodeKind::End, Skip).is_none() {
            self.missing(ch, NodeKind::End);
        }
    }

    /// Whether the body of the innermost block stops here. A section opener
    /// (`%`, `!`, `*`) means the block was never closed.
    fn body_stops(&self) -> bool {
        self.at_keyword(Skip, "end")
            || matches!(self.peek_token(Skip), None | Some('%' | '!' | '*'))
    }

    // input_body: (kv_pair | subblock | variable_def | raw_content)+
    //
    // Comments before the first or after the last item belong to the parent.
    fn input_body(&mut self, parent: &mut Vec<Child>) {
        let mut ch = Vec::new();
        let mut last_item = None;
        loop {
            self.skip(&mut ch, Skip);
            if self.body_stops() {
                break;
            }
            let id = self.body_item().unwrap_or_else(|| self.error_line());
            ch.push(Child::new(id));
            last_item = Some(ch.len());
        }
        let Some(last) = last_item else {
            parent.extend(ch);
            return;
        };
        let trailing = ch.split_off(last);
        let first = ch
            .iter()
            .position(|c| !self.is_comment(c.id))
            .unwrap_or(0);
        let items = ch.split_off(first);
        parent.extend(ch);
        let body = self.nodes.branch(NodeKind::InputBody, items, self.pos);
        parent.push(Child::new(body));
        parent.extend(trailing);
    }

    fn is_comment(&self, id: u32) -> bool {
        self.nodes.kind_of(id) == NodeKind::Comment
    }

    fn body_item(&mut self) -> Option<u32> {
        match self.peek_token(Skip)? {
            '{' => self.raw_content(),
            c if c.is_ascii_alphabetic() => {
                if self.word_then_newline() {
                    if self.depth >= MAX_SUBBLOCK_DEPTH {
                        return None;
                    }
                    return self.subblock();
                }
                self.variable_def().or_else(|| self.kv_pair())
            }
            _ => None,
        }
    }

    // raw_content: brace_block
    fn raw_content(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.brace_block(&mut ch)?;
            Some(s.nodes.branch(NodeKind::RawContent, ch, s.pos))
        })
    }

    // subblock: name:word '\n' (xyz_line+ | int_line+ | zmat_line+ | input_body)? 'end'
    fn subblock(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok_field(&mut ch, Terminal::Word, Field::Name, Skip)?;
            s.newline(&mut ch)?;
            s.skip(&mut ch, Skip);
            if !s.body_stops() && !s.coordinate_run(&mut ch, None) {
                s.depth += 1;
                s.input_body(&mut ch);
                s.depth -= 1;
            }
            s.block_end(&mut ch);
            Some(s.nodes.branch(NodeKind::Subblock, ch, s.pos))
        })
    }

    /// One or more coordinate lines of a single form. With `form == None` the
    /// form is taken from the first line; returns `false` if no line matched.
    fn coordinate_run(&mut self, ch: &mut Vec<Child>, form: Option<LineForm>) -> bool {
        let form = match form {
            Some(f) => f,
            None => {
                let first = LineForm::ALL
                    .into_iter()
                    .find_map(|f| self.coordinate_line(f).map(|id| (f, id)));
                let Some((f, id)) = first else {
                    return false;
                };
                ch.push(Child::new(id));
                f
            }
        };
        loop {
            self.skip(ch, Skip);
            if self.body_stops() {
                break;
            }
            let id = self
                .coordinate_line(form)
                .unwrap_or_else(|| self.error_line());
            ch.push(Child::new(id));
        }
        true
    }

    fn coordinate_line(&mut self, form: LineForm) -> Option<u32> {
        match form {
            LineForm::Xyz => self.xyz_line(),
            LineForm::Internal => self.int_line(),
            LineForm::Zmatrix => self.zmat_line(),
        }
    }

    // xyz_line: element coord_value coord_value coord_value '\n'
    fn xyz_line(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok(&mut ch, Terminal::Element, Skip)?;
            for _ in 0..3 {
                s.coord_value(&mut ch)?;
            }
            s.newline(&mut ch)?;
            Some(s.nodes.branch(NodeKind::XyzLine, ch, s.pos))
        })
    }

    // int_line: element connect1:integer connect2:integer connect3:integer coord_value{3} '\n'
    fn int_line(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok(&mut ch, Terminal::Element, Skip)?;
            for field in [Field::Connect1, Field::Connect2, Field::Connect3] {
                s.integer_ref(&mut ch, field)?;
            }
            for _ in 0..3 {
                s.coord_value(&mut ch)?;
            }
            s.newline(&mut ch)?;
            Some(s.nodes.branch(NodeKind::IntLine, ch, s.pos))
        })
    }

    // zmat_lineN: element (zmat_atomK:integer coord_value){N-1} '\n'
    fn zmat_line(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok(&mut ch, Terminal::Element, Skip)?;
            let mut pairs = 0;
            while let Some(field) = Field::zmat_atom(pairs) {
                let pair = s.attempt(|s| {
                    let mut pair = Vec::new();
                    s.integer_ref(&mut pair, field)?;
                    s.coord_value(&mut pair)?;
                    Some(pair)
                });
                match pair {
                    Some(pair) => ch.extend(pair),
                    None => break,
                }
                pairs += 1;
            }
            s.newline(&mut ch)?;
            let kind = match pairs {
                0 => NodeKind::ZmatLine1,
                1 => NodeKind::ZmatLine2,
                2 => NodeKind::ZmatLine3,
                _ => NodeKind::ZmatLine4,
            };
            Some(s.nodes.branch(kind, ch, s.pos))
        })
    }

    /// Atom reference inside a coordinate line. Rejects integers that are the
    /// head of a decimal (`1.5`).
    fn integer_ref(&mut self, ch: &mut Vec<Child>, field: Field) -> Option<u32> {
        self.attempt(|s| {
            let id = s.tok_field(ch, Terminal::Integer, field, Stop)?;
            match s.peek() {
                Some('.' | 'e') => {
                    ch.pop();
                    None
                }
                _ => Some(id),
            }
        })
    }

    // coord_value: float | variable_ref
    fn coord_value(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            if s.tok(&mut ch, Terminal::Float, Stop).is_none() {
                s.variable_ref(&mut ch)?;
            }
            let id = s.nodes.branch(NodeKind::CoordValue, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // variable_ref: '{' variable_name '}'
    fn variable_ref(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.punct(&mut ch, NodeKind::LBrace, Stop)?;
            s.variable_name(&mut ch, Stop)?;
            s.punct(&mut ch, NodeKind::RBrace, Stop)?;
            let id = s.nodes.branch(NodeKind::VariableRef, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // variable_name: word
    fn variable_name(&mut self, out: &mut Vec<Child>, newlines: Newlines) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok(&mut ch, Terminal::Word, newlines)?;
            let id = s.nodes.branch(NodeKind::VariableName, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // variable_def: variable_name variable_array ';'?
    //             | variable_name '=' (float | integer | variable_range) ';'?
    //
    // Only accepted when the definition completes the line, so `x = 1, 2`
    // falls through to a key/value pair with a list value.
    fn variable_def(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.variable_name(&mut ch, Skip)?;
            match s.peek_token(Skip)? {
                '[' => {
                    s.variable_array(&mut ch)?;
                }
                '=' => {
                    s.punct(&mut ch, NodeKind::Equals, Skip)?;
                    if s.variable_range(&mut ch).is_none() {
                        s.longest(&mut ch, &[Terminal::Float, Terminal::Integer], Skip)?;
                    }
                }
                _ => return None,
            }
            let closed = s.punct(&mut ch, NodeKind::Semicolon, Skip).is_some();
            if !closed && !s.line_ends_here() {
                return None;
            }
            Some(s.nodes.branch(NodeKind::VariableDef, ch, s.pos))
        })
    }

    // variable_range: float ',' float ',' float
    fn variable_range(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok(&mut ch, Terminal::Float, Skip)?;
            for _ in 0..2 {
                s.punct(&mut ch, NodeKind::Comma, Skip)?;
                s.tok(&mut ch, Terminal::Float, Skip)?;
            }
            let id = s.nodes.branch(NodeKind::VariableRange, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // variable_array: '[' float float* ']'
    fn variable_array(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.punct(&mut ch, NodeKind::LBracket, Skip)?;
            s.tok(&mut ch, Terminal::Float, Skip)?;
            while s.tok(&mut ch, Terminal::Float, Skip).is_some() {}
            s.punct(&mut ch, NodeKind::RBracket, Skip)?;
            let id = s.nodes.branch(NodeKind::VariableArray, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // kv_pair: input_key '='? value ';'?
    fn kv_pair(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.input_key(&mut ch)?;
            s.punct(&mut ch, NodeKind::Equals, Skip);
            s.value(&mut ch)?;
            s.punct(&mut ch, NodeKind::Semicolon, Skip);
            Some(s.nodes.branch(NodeKind::KvPair, ch, s.pos))
        })
    }

    // input_key: word | array
    fn input_key(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            let is_array = s.word_then(Skip, '[') && s.array(&mut ch).is_some();
            if !is_array {
                s.tok(&mut ch, Terminal::Word, Skip)?;
            }
            let id = s.nodes.branch(NodeKind::InputKey, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // array: word '[' (string | integer) ']'
    fn array(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.tok(&mut ch, Terminal::Word, Skip)?;
            s.punct(&mut ch, NodeKind::LBracket, Skip)?;
            s.longest(&mut ch, &[Terminal::Integer, Terminal::String], Skip)?;
            s.punct(&mut ch, NodeKind::RBracket, Skip)?;
            let id = s.nodes.branch(NodeKind::Array, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // value: value_atom (',' value_atom)*
    fn value(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.value_atom(&mut ch)?;
            loop {
                let next = s.attempt(|s| {
                    let mut more = Vec::new();
                    s.punct(&mut more, NodeKind::Comma, Skip)?;
                    s.value_atom(&mut more)?;
                    Some(more)
                });
                match next {
                    Some(more) => ch.extend(more),
                    None => break,
                }
            }
            let id = s.nodes.branch(NodeKind::Value, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // value_atom: float | integer | quoted_string | array | brace_block | string | word
    //
    // The longer lexeme wins; on a tie `float` beats `integer` and `word`
    // beats `string`, following declaration order. `integer` is left for
    // lexemes such as `1-3`.
    fn value_atom(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            match s.peek_token(Skip)? {
                '"' => {
                    s.tok(&mut ch, Terminal::QuotedString, Skip)?;
                }
                '{' => {
                    s.brace_block(&mut ch)?;
                }
                c if c.is_ascii_alphabetic() => {
                    let is_array = s.word_then(Skip, '[') && s.array(&mut ch).is_some();
                    if !is_array {
                        s.longest(&mut ch, &[Terminal::Word, Terminal::String], Skip)?;
                    }
                }
                c if c.is_ascii_digit() || c == '-' => {
                    s.longest(&mut ch, &[Terminal::Float, Terminal::Integer], Skip)?;
                }
                _ => return None,
            }
            let id = s.nodes.branch(NodeKind::ValueAtom, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // brace_block: '{' brace_content? '}'
    fn brace_block(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.punct(&mut ch, NodeKind::LBrace, Skip)?;
            if s.peek_token(Skip) != Some('}') {
                s.brace_content(&mut ch)?;
            }
            s.punct(&mut ch, NodeKind::RBrace, Skip)?;
            let id = s.nodes.branch(NodeKind::BraceBlock, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // brace_content: brace_value (','? brace_value)*
    fn brace_content(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.brace_value(&mut ch)?;
            loop {
                let next = s.attempt(|s| {
                    let mut more = Vec::new();
                    s.punct(&mut more, NodeKind::Comma, Skip);
                    s.brace_value(&mut more)?;
                    Some(more)
                });
                match next {
                    Some(more) => ch.extend(more),
                    None => break,
                }
            }
            let id = s.nodes.branch(NodeKind::BraceContent, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // brace_value: float | integer
    fn brace_value(&mut self, out: &mut Vec<Child>) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.longest(&mut ch, &[Terminal::Float, Terminal::Integer], Skip)?;
            let id = s.nodes.branch(NodeKind::BraceValue, ch, s.pos);
            out.push(Child::new(id));
            Some(id)
        })
    }

    // _geom: geom_line | geom_block
    fn geom_item(&mut self) -> Option<u32> {
        self.attempt(|s| {
            let mut ch = Vec::new();
            s.punct(&mut ch, NodeKind::Star, Skip)?;
            if let Some(kind) = [NodeKind::Xyzfile, NodeKind::Gzmtfile]
                .into_iter()
                .find(|k| s.at_keyword(Stop, k.as_str()))
            {
                return s.geom_line_tail(ch, kind);
            }
            let (kind, form) = [
                (NodeKind::Xyz, LineForm::Xyz),
                (NodeKind::Int, LineForm::Internal),
                (NodeKind::Gzmt, LineForm::Zmatrix),
            ]
            .into_iter()
            .find(|(k, _)| s.at_keyword(Stop, k.as_str()))?;
            s.geom_block_tail(ch, kind, form)
        })
    }

    // geom_line: '*' geom_line_types integer integer file '\n'
    fn geom_line_tail(&mut self, mut ch: Vec<Child>, kind: NodeKind) -> Option<u32> {
        let mut types = Vec::new();
        self.keyword(&mut types, kind, Stop)?;
        let types = self.nodes.branch(NodeKind::GeomLineTypes, types, self.pos);
        ch.push(Child::new(types));
        self.tok(&mut ch, Terminal::Integer, Stop)?;
        self.tok(&mut ch, Terminal::Integer, Stop)?;
        self.tok(&mut ch, Terminal::File, Stop)?;
        self.newline(&mut ch)?;
        Some(self.nodes.branch(NodeKind::GeomLine, ch, self.pos))
    }

    // geom_block: '*' ('xyz' | 'int' | 'gzmt') integer integer '\n' line+ '*' '\n'
    fn geom_block_tail(&mut self, mut ch: Vec<Child>, kind: NodeKind, form: LineForm) -> Option<u32> {
        self.keyword(&mut ch, kind, Stop)?;
        self.tok(&mut ch, Terminal::Integer, Stop)?;
        self.tok(&mut ch, Terminal::Integer, Stop)?;
        self.newline(&mut ch)?;
        self.coordinate_run(&mut ch, Some(form));
        if self.punct(&mut ch, NodeKind::Star, Skip).is_some() {
            if self.newline(&mut ch).is_none() {
                self.skip(&mut ch, Stop);
                let err = self.error_line();
                ch.push(Child::new(err));
                self.newline(&mut ch);
            }
        } else {
            self.missing(&mut ch, NodeKind::Star);
        }
        Some(self.nodes.branch(NodeKind::GeomBlock, ch, self.pos))
    }
}
