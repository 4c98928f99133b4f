//! Concrete syntax tree.
//!
//! A [`Tree`] owns its source text and an arena of nodes; [`Node`] is a cheap
//! `Copy` handle into that arena. The API follows tree-sitter's node API so
//! consumers used to `tree_sitter::Node` feel at home.

use crate::language::{Field, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Range;

/// Zero-based row/column position. Columns count bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    kind: NodeKind,
    start_byte: usize,
    end_byte: usize,
    start_point: Point,
    end_point: Point,
    parent: Option<u32>,
    children: Vec<u32>,
    fields: Vec<Option<Field>>,
    missing: bool,
    has_error: bool,
}

/// A child reference handed to [`TreeBuilder::branch`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Child {
    pub(crate) id: u32,
    pub(crate) field: Option<Field>,
}

impl Child {
    pub(crate) fn new(id: u32) -> Self {
        Self { id, field: None }
    }
}

/// Append-only node arena used while parsing. Children are always allocated
/// before their parent, which lets [`TreeBuilder::finish`] compute parent
/// links and error flags in one forward pass.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node allocated after `len` (used when backtracking).
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    #[cfg(test)]
    pub(crate) fn range_of(&self, id: u32) -> Range<usize> {
        let n = &self.nodes[id as usize];
        n.start_byte..n.end_byte
    }

    pub(crate) fn kind_of(&self, id: u32) -> NodeKind {
        self.nodes[id as usize].kind
    }

    fn push(&mut self, data: NodeData) -> u32 {
        self.nodes.push(data);
        (self.nodes.len() - 1) as u32
    }

    pub(crate) fn leaf(&mut self, kind: NodeKind, range: Range<usize>) -> u32 {
        self.push(NodeData::new(kind, range))
    }

    /// Zero-width node standing in for a required token that is absent.
    pub(crate) fn missing(&mut self, kind: NodeKind, at: usize) -> u32 {
        let mut data = NodeData::new(kind, at..at);
        data.missing = true;
        self.push(data)
    }

    /// Interior node spanning its children. `at` positions a childless node.
    pub(crate) fn branch(&mut self, kind: NodeKind, children: Vec<Child>, at: usize) -> u32 {
        let start = children
            .first()
            .map_or(at, |c| self.nodes[c.id as usize].start_byte);
        let end = children
            .last()
            .map_or(at, |c| self.nodes[c.id as usize].end_byte);
        let mut data = NodeData::new(kind, start..end);
        data.fields = children.iter().map(|c| c.field).collect();
        data.children = children.iter().map(|c| c.id).collect();
        self.push(data)
    }

    /// Like [`TreeBuilder::branch`] but with an explicit byte range.
    pub(crate) fn branch_spanning(
        &mut self,
        kind: NodeKind,
        children: Vec<Child>,
        range: Range<usize>,
    ) -> u32 {
        let id = self.branch(kind, children, range.start);
        let data = &mut self.nodes[id as usize];
        data.start_byte = range.start;
        data.end_byte = range.end;
        id
    }

    pub(crate) fn finish(mut self, source: String, root: u32) -> Tree {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let point_at = |byte: usize| {
            let row = line_starts.partition_point(|s| *s <= byte) - 1;
            Point {
                row,
                column: byte - line_starts[row],
            }
        };

        for i in 0..self.nodes.len() {
            let (start, end) = (self.nodes[i].start_byte, self.nodes[i].end_byte);
            self.nodes[i].start_point = point_at(start);
            self.nodes[i].end_point = point_at(end);

            let children = std::mem::take(&mut self.nodes[i].children);
            let mut has_error = self.nodes[i].kind == NodeKind::Error || self.nodes[i].missing;
            for c in &children {
                let child = &mut self.nodes[*c as usize];
                child.parent = Some(i as u32);
                has_error |= child.has_error;
            }
            self.nodes[i].children = children;
            self.nodes[i].has_error = has_error;
        }

        Tree {
            source,
            nodes: self.nodes,
            root,
        }
    }
}

impl NodeData {
    fn new(kind: NodeKind, range: Range<usize>) -> Self {
        Self {
            kind,
            start_byte: range.start,
            end_byte: range.end,
            start_point: Point::default(),
            end_point: Point::default(),
            parent: None,
            children: Vec::new(),
            fields: Vec::new(),
            missing: false,
            has_error: false,
        }
    }
}

/// A parsed ORCA input.
#[derive(Clone)]
pub struct Tree {
    source: String,
    nodes: Vec<NodeData>,
    root: u32,
}

impl Tree {
    pub fn root_node(&self) -> Node<'_> {
        Node {
            tree: self,
            id: self.root,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the parser had to recover from malformed input anywhere.
    pub fn has_error(&self) -> bool {
        self.root_node().has_error()
    }

    /// Total number of nodes, named and anonymous.
    pub fn node_count(&self) -> usize {
        self.root_node().descendants().count()
    }

    /// Every `ERROR` and MISSING node, in document order.
    pub fn error_nodes(&self) -> Vec<Node<'_>> {
        self.root_node()
            .descendants()
            .filter(|n| n.is_error() || n.is_missing())
            .collect()
    }

    /// Owned, serializable copy of the tree.
    pub fn to_syntax_node(&self) -> SyntaxNode {
        SyntaxNode::from_root(self.root_node())
    }

    fn data(&self, id: u32) -> &NodeData {
        &self.nodes[id as usize]
    }
}

impl Debug for Tree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{Tree {}}}", self.root_node().to_sexp())
    }
}

/// Handle to one node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: u32,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    fn at(&self, id: u32) -> Node<'t> {
        Node { tree: self.tree, id }
    }

    pub fn id(&self) -> usize {
        self.id as usize
    }

    pub fn node_kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn kind(&self) -> &'static str {
        self.data().kind.as_str()
    }

    pub fn kind_id(&self) -> u16 {
        self.data().kind.id()
    }

    pub fn is_named(&self) -> bool {
        self.data().kind.is_named()
    }

    pub fn is_error(&self) -> bool {
        self.data().kind == NodeKind::Error
    }

    pub fn is_missing(&self) -> bool {
        self.data().missing
    }

    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    pub fn start_byte(&self) -> usize {
        self.data().start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.data().end_byte
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }

    pub fn start_position(&self) -> Point {
        self.data().start_point
    }

    pub fn end_position(&self) -> Point {
        self.data().end_point
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|p| self.at(p))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, i: usize) -> Option<Node<'t>> {
        self.data().children.get(i).map(|c| self.at(*c))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |c| Node { tree, id: *c })
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(|c| c.is_named())
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn named_child(&self, i: usize) -> Option<Node<'t>> {
        self.named_children().nth(i)
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.node_kind() == kind)
    }

    pub fn field_name_for_child(&self, i: usize) -> Option<&'static str> {
        self.data()
            .fields
            .get(i)
            .copied()
            .flatten()
            .map(Field::as_str)
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'t>> {
        self.children_by_field_name(name).next()
    }

    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'t>> + use<'t> {
        let field = Field::from_name(name);
        let tree = self.tree;
        let data = self.data();
        data.children
            .iter()
            .zip(data.fields.iter())
            .filter(move |(_, f)| field.is_some() && **f == field)
            .map(move |(c, _)| Node { tree, id: *c })
    }

    /// Source text covered by the node.
    pub fn utf8_text(&self) -> &'t str {
        &self.tree.source[self.byte_range()]
    }

    /// Pre-order walk over this node and everything below it.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants { stack: vec![*self] }
    }

    /// S-expression of the named structure, tree-sitter style.
    pub fn to_sexp(&self) -> String {
        enum Step<'t> {
            Open(Node<'t>, Option<&'static str>),
            Close,
        }

        let mut out = String::new();
        let mut stack = vec![Step::Open(*self, None)];
        while let Some(step) = stack.pop() {
            let Step::Open(node, field) = step else {
                out.push(')');
                continue;
            };
            if !out.is_empty() {
                out.push(' ');
            }
            if let Some(f) = field {
                out.push_str(f);
                out.push_str(": ");
            }
            if node.is_missing() {
                if node.is_named() {
                    out.push_str(&format!("(MISSING {})", node.kind()));
                } else {
                    out.push_str(&format!("(MISSING {:?})", node.kind()));
                }
                continue;
            }
            out.push('(');
            out.push_str(node.kind());
            stack.push(Step::Close);
            let shown: Vec<Step<'t>> = node
                .children()
                .enumerate()
                .filter(|(_, c)| c.is_named() || c.is_missing())
                .map(|(i, c)| Step::Open(c, node.field_name_for_child(i)))
                .collect();
            stack.extend(shown.into_iter().rev());
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl Debug for Node<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'t> {
    stack: Vec<Node<'t>>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<Node<'t>> = node.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

/// Owned tree snapshot for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: String,
    pub named: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub missing: bool,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start: Point,
    pub end: Point,
    /// Source text, kept for leaves only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Snapshot of `root` and everything below it, built with an explicit
    /// stack of partially filled parents.
    fn from_root(root: Node<'_>) -> Self {
        let mut stack: Vec<(Node<'_>, Option<&'static str>, Vec<SyntaxNode>)> =
            vec![(root, None, Vec::new())];
        let mut done = None;
        while let Some((node, field, built)) = stack.pop() {
            let next = built.len();
            if let Some(child) = node.child(next) {
                let child_field = node.field_name_for_child(next);
                stack.push((node, field, built));
                stack.push((child, child_field, Vec::new()));
                continue;
            }
            let snap = SyntaxNode::new(node, field, built);
            match stack.last_mut() {
                Some((_, _, siblings)) => siblings.push(snap),
                None => done = Some(snap),
            }
        }
        done.unwrap_or_else(|| SyntaxNode::new(root, None, Vec::new()))
    }

    fn new(node: Node<'_>, field: Option<&str>, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind: node.kind().to_string(),
            named: node.is_named(),
            field: field.map(str::to_string),
            missing: node.is_missing(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start: node.start_position(),
            end: node.end_position(),
            text: children
                .is_empty()
                .then(|| node.utf8_text().to_string()),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `(source_file (simple_line (arg)))` over "! Opt\n" built by hand.
    fn small_tree() -> Tree {
        let mut b = TreeBuilder::default();
        let bang = b.leaf(NodeKind::Bang, 0..1);
        let arg = b.leaf(NodeKind::Arg, 2..5);
        let nl = b.leaf(NodeKind::Newline, 5..6);
        let line = b.branch(
            NodeKind::SimpleLine,
            vec![Child::new(bang), Child::new(arg), Child::new(nl)],
            0,
        );
        let root = b.branch_spanning(NodeKind::SourceFile, vec![Child::new(line)], 0..6);
        b.finish("! Opt\n".to_string(), root)
    }

    #[test]
    fn builder_links_parents_and_positions() {
        let tree = small_tree();
        let root = tree.root_node();
        assert_eq!(root.kind(), "source_file");
        assert_eq!(root.byte_range(), 0..6);
        let line = root.child(0).unwrap();
        assert_eq!(line.parent(), Some(root));
        let arg = line.named_child(0).unwrap();
        assert_eq!(arg.utf8_text(), "Opt");
        assert_eq!(arg.start_position(), Point { row: 0, column: 2 });
        assert_eq!(line.end_position(), Point { row: 1, column: 0 });
        assert!(!tree.has_error());
    }

    #[test]
    fn sexp_skips_anonymous_nodes() {
        let tree = small_tree();
        assert_eq!(tree.root_node().to_sexp(), "(source_file (simple_line (arg)))");
    }

    #[test]
    fn missing_nodes_propagate_errors() {
        let mut b = TreeBuilder::default();
        let end = b.missing(NodeKind::End, 3);
        let root = b.branch_spanning(NodeKind::SourceFile, vec![Child::new(end)], 0..3);
        let tree = b.finish("abc".to_string(), root);
        assert!(tree.has_error());
        assert_eq!(tree.root_node().to_sexp(), "(source_file (MISSING \"end\"))");
        assert_eq!(tree.error_nodes().len(), 1);
    }

    #[test]
    fn sexp_of_a_deep_chain_runs_on_a_small_stack() {
        let depth = 100_000;
        let sexp = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let mut b = TreeBuilder::default();
                let mut id = b.leaf(NodeKind::Word, 0..1);
                for _ in 0..depth {
                    id = b.branch(NodeKind::InputBody, vec![Child::new(id)], 0);
                }
                let root = b.branch_spanning(NodeKind::SourceFile, vec![Child::new(id)], 0..1);
                b.finish("a".to_string(), root).root_node().to_sexp()
            })
            .unwrap()
            .join()
            .unwrap();
        assert!(sexp.starts_with("(source_file (input_body (input_body"));
        assert!(sexp.ends_with("(word)))))"));
        assert_eq!(sexp.matches('(').count(), depth + 2);
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = small_tree();
        let kinds: Vec<&str> = tree.root_node().descendants().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec!["source_file", "simple_line", "!", "arg", "\n"]);
    }

    #[test]
    fn syntax_node_keeps_leaf_text() {
        let tree = small_tree();
        let snap = tree.to_syntax_node();
        let arg = &snap.children[0].children[1];
        assert_eq!(arg.kind, "arg");
        assert_eq!(arg.text.as_deref(), Some("Opt"));
        assert!(snap.children[0].text.is_none());
    }
}
