pub mod diagnostic;
pub mod document;
pub mod geometry;
pub mod graph;
pub mod span;
