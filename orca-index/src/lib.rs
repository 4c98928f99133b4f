//! Directory indexing for ORCA input files.
//!
//! Scans a tree of `.inp` files, parses each with the ORCA grammar and writes
//! structured documents, syntax diagnostics and a file reference graph.
//! The entry point is [`index_directory`].

pub mod config;
pub mod core;
pub mod export;
pub mod graph;
pub mod model;
mod run;

pub use config::model::IndexConfig;
pub use export::save_all::PersistSummary;
pub use model::{diagnostic::Diagnostic, document::InputDocument};
pub use run::{index_directory, index_directory_with};
