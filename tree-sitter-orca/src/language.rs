//! Grammar descriptor for ORCA input files.
//!
//! The descriptor is a process-wide immutable table of node kinds and field
//! names. It is exposed both as a safe `&'static` reference ([`language`]) and
//! through the C symbol `tree_sitter_orca` (see [`crate::ffi`]).
//!
//! Ids are stable for a given [`ABI_VERSION`]: node kind ids are the enum
//! discriminants of [`NodeKind`], field ids are 1-based (0 means "no field").

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Version of the descriptor layout. Parsers refuse descriptors with a
/// different version.
pub const ABI_VERSION: u32 = 14;

/// Every symbol that can appear in a syntax tree.
///
/// Hidden rules of the grammar (`_input`, `_geom`) are inlined by the parser
/// and have no variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum NodeKind {
    // named rules
    SourceFile = 0,
    SimpleLine,
    InputLine,
    InputBlock,
    InputBody,
    Subblock,
    KvPair,
    VariableDef,
    VariableName,
    VariableRange,
    VariableArray,
    Value,
    ValueAtom,
    InputKey,
    InputTitle,
    GeomLine,
    GeomBlock,
    GeomLineTypes,
    IntLine,
    ZmatLine1,
    ZmatLine2,
    ZmatLine3,
    ZmatLine4,
    XyzLine,
    CoordValue,
    VariableRef,
    Array,
    BraceBlock,
    BraceContent,
    BraceValue,
    RawContent,
    // named tokens
    Comment,
    Element,
    Word,
    String,
    QuotedString,
    Float,
    Integer,
    File,
    Arg,
    // recovery
    Error,
    // anonymous tokens
    Bang,
    Newline,
    Percent,
    End,
    Equals,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Star,
    Xyz,
    Int,
    Gzmt,
    Xyzfile,
    Gzmtfile,
}

impl NodeKind {
    /// All kinds, indexed by id.
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::SourceFile,
        NodeKind::SimpleLine,
        NodeKind::InputLine,
        NodeKind::InputBlock,
        NodeKind::InputBody,
        NodeKind::Subblock,
        NodeKind::KvPair,
        NodeKind::VariableDef,
        NodeKind::VariableName,
        NodeKind::VariableRange,
        NodeKind::VariableArray,
        NodeKind::Value,
        NodeKind::ValueAtom,
        NodeKind::InputKey,
        NodeKind::InputTitle,
        NodeKind::GeomLine,
        NodeKind::GeomBlock,
        NodeKind::GeomLineTypes,
        NodeKind::IntLine,
        NodeKind::ZmatLine1,
        NodeKind::ZmatLine2,
        NodeKind::ZmatLine3,
        NodeKind::ZmatLine4,
        NodeKind::XyzLine,
        NodeKind::CoordValue,
        NodeKind::VariableRef,
        NodeKind::Array,
        NodeKind::BraceBlock,
        NodeKind::BraceContent,
        NodeKind::BraceValue,
        NodeKind::RawContent,
        NodeKind::Comment,
        NodeKind::Element,
        NodeKind::Word,
        NodeKind::String,
        NodeKind::QuotedString,
        NodeKind::Float,
        NodeKind::Integer,
        NodeKind::File,
        NodeKind::Arg,
        NodeKind::Error,
        NodeKind::Bang,
        NodeKind::Newline,
        NodeKind::Percent,
        NodeKind::End,
        NodeKind::Equals,
        NodeKind::Semicolon,
        NodeKind::Comma,
        NodeKind::LBracket,
        NodeKind::RBracket,
        NodeKind::LBrace,
        NodeKind::RBrace,
        NodeKind::Star,
        NodeKind::Xyz,
        NodeKind::Int,
        NodeKind::Gzmt,
        NodeKind::Xyzfile,
        NodeKind::Gzmtfile,
    ];

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Name as it appears in S-expressions and queries.
    pub fn as_str(self) -> &'static str {
        use NodeKind::*;
        match self {
            SourceFile => "source_file",
            SimpleLine => "simple_line",
            InputLine => "input_line",
            InputBlock => "input_block",
            InputBody => "input_body",
            Subblock => "subblock",
            KvPair => "kv_pair",
            VariableDef => "variable_def",
            VariableName => "variable_name",
            VariableRange => "variable_range",
            VariableArray => "variable_array",
            Value => "value",
            ValueAtom => "value_atom",
            InputKey => "input_key",
            InputTitle => "input_title",
            GeomLine => "geom_line",
            GeomBlock => "geom_block",
            GeomLineTypes => "geom_line_types",
            IntLine => "int_line",
            ZmatLine1 => "zmat_line1",
            ZmatLine2 => "zmat_line2",
            ZmatLine3 => "zmat_line3",
            ZmatLine4 => "zmat_line4",
            XyzLine => "xyz_line",
            CoordValue => "coord_value",
            VariableRef => "variable_ref",
            Array => "array",
            BraceBlock => "brace_block",
            BraceContent => "brace_content",
            BraceValue => "brace_value",
            RawContent => "raw_content",
            Comment => "comment",
            Element => "element",
            Word => "word",
            String => "string",
            QuotedString => "quoted_string",
            Float => "float",
            Integer => "integer",
            File => "file",
            Arg => "arg",
            Error => "ERROR",
            Bang => "!",
            Newline => "\n",
            Percent => "%",
            End => "end",
            Equals => "=",
            Semicolon => ";",
            Comma => ",",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Star => "*",
            Xyz => "xyz",
            Int => "int",
            Gzmt => "gzmt",
            Xyzfile => "xyzfile",
            Gzmtfile => "gzmtfile",
        }
    }

    /// Named kinds are grammar rules and regex tokens; anonymous kinds are
    /// string literals.
    pub fn is_named(self) -> bool {
        self <= NodeKind::Error
    }

    /// Kinds that never have children.
    pub fn is_token(self) -> bool {
        self >= NodeKind::Comment && self != NodeKind::Error
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names attached to children of a few rules.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum Field {
    Connect1 = 1,
    Connect2,
    Connect3,
    Name,
    ZmatAtom1,
    ZmatAtom2,
    ZmatAtom3,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Connect1,
        Field::Connect2,
        Field::Connect3,
        Field::Name,
        Field::ZmatAtom1,
        Field::ZmatAtom2,
        Field::ZmatAtom3,
    ];

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Connect1 => "connect1",
            Field::Connect2 => "connect2",
            Field::Connect3 => "connect3",
            Field::Name => "name",
            Field::ZmatAtom1 => "zmat_atom1",
            Field::ZmatAtom2 => "zmat_atom2",
            Field::ZmatAtom3 => "zmat_atom3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    /// Zmatrix reference field for the `n`-th (0-based) atom/value pair.
    pub(crate) fn zmat_atom(n: usize) -> Option<Self> {
        [Field::ZmatAtom1, Field::ZmatAtom2, Field::ZmatAtom3]
            .get(n)
            .copied()
    }
}

/// One entry of [`Language::node_types`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTypeInfo {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub named: bool,
}

/// Immutable grammar descriptor.
#[derive(Debug)]
pub struct Language {
    name: &'static str,
    abi_version: u32,
    kinds: &'static [NodeKind],
    fields: &'static [Field],
}

pub(crate) static LANGUAGE: Language = Language {
    name: "orca",
    abi_version: ABI_VERSION,
    kinds: NodeKind::ALL,
    fields: Field::ALL,
};

/// The ORCA grammar descriptor. Every call returns the same reference.
pub fn language() -> &'static Language {
    &LANGUAGE
}

impl Language {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn abi_version(&self) -> u32 {
        self.abi_version
    }

    pub fn node_kind_count(&self) -> usize {
        self.kinds.len()
    }

    pub fn node_kind_for_id(&self, id: u16) -> Option<&'static str> {
        self.kinds.get(id as usize).map(|k| k.as_str())
    }

    pub fn node_kind_is_named(&self, id: u16) -> bool {
        self.kinds.get(id as usize).is_some_and(|k| k.is_named())
    }

    /// Look up a kind id by name. Named and anonymous kinds live in separate
    /// namespaces, so `"end"` only resolves with `named = false`.
    pub fn id_for_node_kind(&self, kind: &str, named: bool) -> Option<u16> {
        self.kinds
            .iter()
            .find(|k| k.is_named() == named && k.as_str() == kind)
            .map(|k| k.id())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_name_for_id(&self, id: u16) -> Option<&'static str> {
        Field::from_id(id).map(Field::as_str)
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<u16> {
        Field::from_name(name).map(Field::id)
    }

    /// Kind listing for tooling (`node-types` style).
    pub fn node_types(&self) -> Vec<NodeTypeInfo> {
        self.kinds
            .iter()
            .map(|k| NodeTypeInfo {
                kind: k.as_str(),
                named: k.is_named(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_positions() {
        for (i, k) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(k.id() as usize, i, "{k:?} out of place");
            assert_eq!(NodeKind::from_id(i as u16), Some(*k));
        }
        for (i, f) in Field::ALL.iter().enumerate() {
            assert_eq!(f.id() as usize, i + 1);
        }
        assert_eq!(Field::from_id(0), None);
    }

    #[test]
    fn named_and_anonymous_namespaces() {
        let lang = language();
        assert_eq!(
            lang.id_for_node_kind("end", false),
            Some(NodeKind::End.id())
        );
        assert_eq!(lang.id_for_node_kind("end", true), None);
        assert_eq!(
            lang.id_for_node_kind("word", true),
            Some(NodeKind::Word.id())
        );
        assert!(lang.node_kind_is_named(NodeKind::Error.id()));
        assert!(!lang.node_kind_is_named(NodeKind::Star.id()));
        assert!(NodeKind::Arg.is_token());
        assert!(!NodeKind::Error.is_token());
    }

    #[test]
    fn field_lookup_round_trips_names() {
        let lang = language();
        let id = lang.field_id_for_name("connect2").unwrap();
        assert_eq!(lang.field_name_for_id(id), Some("connect2"));
        assert_eq!(lang.field_id_for_name("nope"), None);
        assert_eq!(lang.field_count(), 7);
    }

    #[test]
    fn node_types_serialize_with_type_key() {
        let json = serde_json::to_value(language().node_types()).unwrap();
        assert_eq!(json[0]["type"], "source_file");
        assert_eq!(json[0]["named"], true);
    }
}
