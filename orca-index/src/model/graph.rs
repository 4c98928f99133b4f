//! Graph-related types shared by the graph builder and exporters.
//!
//! Edges are a compact enum that serializes to snake_case strings, keeping
//! JSONL/GraphML output stable and grep-friendly.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNodeKind {
    /// An indexed input file.
    Document,
    /// A file referenced by an input but not itself indexed.
    External,
}

impl Display for GraphNodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GraphNodeKind::Document => "document",
            GraphNodeKind::External => "external",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: GraphNodeKind,
    /// Repository-relative path.
    pub path: String,
}

/// Edge label. Avoid renaming variants, they are part of exported artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphEdgeLabel {
    /// `*xyzfile` / `*gzmtfile` coordinate source.
    ReadsGeometry,
    /// Quoted file name in a setting, e.g. `%moinp "guess.gbw"`.
    ReadsFile,
}

impl Display for GraphEdgeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GraphEdgeLabel::ReadsGeometry => "reads_geometry",
            GraphEdgeLabel::ReadsFile => "reads_file",
        })
    }
}
