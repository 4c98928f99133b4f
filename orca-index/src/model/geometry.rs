//! Molecular geometry as declared by `*` lines and coordinate subblocks.

use crate::model::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Coordinate convention of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateForm {
    /// Cartesian (`xyz`).
    Cartesian,
    /// Internal coordinates with explicit connectivity (`int`).
    Internal,
    /// Z-matrix (`gzmt`).
    Zmatrix,
}

impl CoordinateForm {
    /// Map the geometry keyword (`xyz`, `int`, `gzmt`, `xyzfile`, `gzmtfile`).
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw {
            "xyz" | "xyzfile" => Some(Self::Cartesian),
            "int" => Some(Self::Internal),
            "gzmt" | "gzmtfile" => Some(Self::Zmatrix),
            _ => None,
        }
    }
}

impl Display for CoordinateForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CoordinateForm::Cartesian => "cartesian",
            CoordinateForm::Internal => "internal",
            CoordinateForm::Zmatrix => "zmatrix",
        })
    }
}

/// A coordinate is either a number or a `{name}` reference to a `%paras` variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coordinate {
    Value(f64),
    Variable(String),
}

/// One atom line.
///
/// `refs` holds the connectivity of internal/Z-matrix lines (1-based atom
/// indices, `0` meaning none); it is empty for Cartesian lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element: String,
    pub refs: Vec<u32>,
    pub coords: Vec<Coordinate>,
    pub line: usize,
}

/// Where the atoms of a geometry live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GeometrySource {
    /// Atoms listed in the input itself.
    Inline { atoms: Vec<Atom> },
    /// Atoms read from another file (`*xyzfile`, `*gzmtfile`).
    File { path: String },
}

/// A `*` geometry with total charge and spin multiplicity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub form: CoordinateForm,
    pub charge: i64,
    pub multiplicity: i64,
    #[serde(flatten)]
    pub source: GeometrySource,
    pub span: Span,
}

impl Geometry {
    /// Number of inline atoms (0 for file references).
    pub fn atom_count(&self) -> usize {
        match &self.source {
            GeometrySource::Inline { atoms } => atoms.len(),
            GeometrySource::File { .. } => 0,
        }
    }

    /// Referenced coordinate file, if any.
    pub fn file(&self) -> Option<&str> {
        match &self.source {
            GeometrySource::File { path } => Some(path),
            GeometrySource::Inline { .. } => None,
        }
    }
}
