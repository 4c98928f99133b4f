//! Persist all artifacts into the given output directory.
//!
//! Layout:
//!   out_dir/
//!     documents.jsonl
//!     diagnostics.jsonl
//!     graph.graphml
//!     summary.json
//!
//! `out_dir` is expected to be a timestamped folder chosen by the caller.
//! This module ensures the directory exists and writes all files, returning a
//! [`PersistSummary`] with paths and counts.

use crate::{
    core::summary::PipelineSummary,
    export::{graphml::write_graphml, jsonl},
    model::{
        diagnostic::Diagnostic,
        document::InputDocument,
        graph::{GraphEdgeLabel, GraphNode},
    },
};
use anyhow::{Context, Result};
use petgraph::graph::Graph;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::info;

/// File paths of the persisted artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistFiles {
    pub documents_jsonl: String,
    pub diagnostics_jsonl: String,
    pub graph_graphml: String,
    pub summary_json: String,
}

/// Top-level summary returned to the caller and also written to `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistSummary {
    pub out_dir: String,
    pub files: PersistFiles,
    pub edge_labels: BTreeMap<String, usize>,
    pub summary: PipelineSummary,
}

/// Write all artifacts to `out_dir` and return [`PersistSummary`].
pub fn persist_all(
    out_dir: &Path,
    documents: &[InputDocument],
    diagnostics: &[Diagnostic],
    graph: &Graph<GraphNode, GraphEdgeLabel>,
    summary: PipelineSummary,
) -> Result<PersistSummary> {
    fs::create_dir_all(out_dir).with_context(|| format!("create_dir_all {}", out_dir.display()))?;
    info!("persist: dir prepared -> {}", out_dir.display());

    let p_documents = out_dir.join("documents.jsonl");
    let p_diagnostics = out_dir.join("diagnostics.jsonl");
    let p_graphml = out_dir.join("graph.graphml");
    let p_summary = out_dir.join("summary.json");

    jsonl::write_documents_jsonl(&p_documents, documents)?;
    jsonl::write_diagnostics_jsonl(&p_diagnostics, diagnostics)?;
    write_graphml(&p_graphml, graph)?;

    let files = PersistFiles {
        documents_jsonl: p_documents.to_string_lossy().into_owned(),
        diagnostics_jsonl: p_diagnostics.to_string_lossy().into_owned(),
        graph_graphml: p_graphml.to_string_lossy().into_owned(),
        summary_json: p_summary.to_string_lossy().into_owned(),
    };
    let persist = PersistSummary {
        out_dir: out_dir.to_string_lossy().into_owned(),
        files,
        edge_labels: count_edge_labels(graph),
        summary,
    };

    {
        let f = fs::File::create(&p_summary)
            .with_context(|| format!("create {}", p_summary.display()))?;
        let w = std::io::BufWriter::new(f);
        serde_json::to_writer_pretty(w, &persist)?;
    }

    info!("persist: all artifacts written");
    Ok(persist)
}

fn count_edge_labels(graph: &Graph<GraphNode, GraphEdgeLabel>) -> BTreeMap<String, usize> {
    let mut m: BTreeMap<String, usize> = BTreeMap::new();
    for e in graph.edge_indices() {
        *m.entry(graph[e].to_string()).or_insert(0) += 1;
    }
    m
}
