//! High-level orchestration for indexing a directory of ORCA inputs.
//!
//! [`index_directory`] scans the root, parses every input with the ORCA
//! grammar, extracts structured documents and diagnostics, links documents to
//! the files they read, and exports all artifacts (JSONL/GraphML/summary)
//! into `<out>/<timestamp>/`.

use crate::{
    config::{self, model::IndexConfig},
    core::{
        fs_scan, parse,
        summary::{PipelineSummary, SummaryStopwatch},
    },
    export::save_all,
    graph,
    model::{diagnostic::Diagnostic, document::InputDocument},
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main pipeline: index every input under `root`.
///
/// Configuration comes from `<root>/.orcaindex.yml` and `ORCA_INDEX_*`
/// environment overrides.
///
/// # Steps:
/// 1. **Scan** filesystem, applying extension/glob/size filters.
/// 2. **Parse & extract** documents and diagnostics.
/// 3. **Build graph** of geometry and file references.
/// 4. **Export** all artifacts into `<out>/<timestamp>/`.
#[tracing::instrument(level = "info", skip_all, fields(root = %root.display()))]
pub fn index_directory(root: &Path, out: &Path) -> Result<save_all::PersistSummary> {
    let root_path =
        dunce::canonicalize(root).with_context(|| format!("canonicalize {}", root.display()))?;
    let config = config::load(&root_path)?;
    info!("Configuration loaded");
    index_directory_with(&root_path, out, &config)
}

/// Same as [`index_directory`] with an explicit configuration.
pub fn index_directory_with(
    root: &Path,
    out: &Path,
    config: &IndexConfig,
) -> Result<save_all::PersistSummary> {
    config.validate()?;
    let mut sw = SummaryStopwatch::start();

    let scan_result = fs_scan::scan_repo(root, config)?;
    sw.stop_scan();
    info!(files = scan_result.files.len(), "Scanned filesystem");

    let mut documents: Vec<InputDocument> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for file in &scan_result.files {
        match parse::parse_and_extract(file, config) {
            Ok((doc, diags)) => {
                documents.push(doc);
                diagnostics.extend(diags);
            }
            Err(err) => {
                warn!(path = %file.path.display(), error = %err, "Failed to parse/extract");
            }
        }
    }
    sw.stop_parse_extract();
    info!(
        documents = documents.len(),
        diagnostics = diagnostics.len(),
        "Extracted documents"
    );

    let graph = graph::build_reference_graph(&documents, config)?;
    sw.stop_graph_build();
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built graph"
    );

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%3f").to_string();
    let out_dir = run_dir(out, &timestamp);

    let summary = PipelineSummary::from_counts(&scan_result, &documents, &diagnostics, &graph);
    let persisted = save_all::persist_all(
        &out_dir,
        &documents,
        &diagnostics,
        &graph,
        summary.with_timings(sw.into_timings()),
    )?;

    info!(out_dir = %out_dir.display(), "Artifacts saved");
    Ok(persisted)
}

/// `<out>/<stamp>`, or `<out>/<stamp>_N` with the first free `N` from 2 when
/// an earlier run already used the name.
fn run_dir(out: &Path, stamp: &str) -> PathBuf {
    let mut dir = out.join(stamp);
    let mut n = 1;
    while dir.exists() {
        n += 1;
        dir = out.join(format!("{stamp}_{n}"));
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_dir_adds_a_suffix_when_taken() {
        let out = tempfile::tempdir().unwrap();
        let first = run_dir(out.path(), "20240101_120000_000");
        assert_eq!(first, out.path().join("20240101_120000_000"));
        std::fs::create_dir(&first).unwrap();
        let second = run_dir(out.path(), "20240101_120000_000");
        assert_eq!(second, out.path().join("20240101_120000_000_2"));
        std::fs::create_dir(&second).unwrap();
        assert_eq!(
            run_dir(out.path(), "20240101_120000_000"),
            out.path().join("20240101_120000_000_3")
        );
    }
}
