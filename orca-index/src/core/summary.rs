//! Pipeline summary: counters and timings collected during one indexing run.
//!
//! Serialized into `summary.json`. Field names are lowercase with underscores
//! so they are easy to query downstream.
//!
//! ```ignore
//! let mut sw = SummaryStopwatch::start();
//! // ... scan ...
//! sw.stop_scan();
//! // ... parse+extract ...
//! sw.stop_parse_extract();
//! // ... graph ...
//! sw.stop_graph_build();
//!
//! let summary = PipelineSummary::from_counts(&scan, &docs, &diags, &graph)
//!     .with_timings(sw.into_timings());
//! ```

use crate::core::fs_scan::ScanResult;
use crate::model::diagnostic::{Diagnostic, DiagnosticKind};
use crate::model::document::InputDocument;
use crate::model::graph::{GraphEdgeLabel, GraphNode};
use chrono::{DateTime, Utc};
use petgraph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// High-level summary with counts and timings for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// RFC 3339 UTC timestamp when the summary was produced.
    pub generated_at: String,

    pub counts: Counts,

    /// Time spent in pipeline phases (milliseconds).
    pub timings_ms: TimingsMs,
}

/// Aggregate counters used by [`PipelineSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Counts {
    /// Files accepted by the scanner.
    pub files_scanned: usize,
    pub files_skipped_ignored: usize,
    pub files_skipped_too_big: usize,

    /// Documents successfully parsed and extracted.
    pub documents: usize,
    pub documents_with_errors: usize,

    /// Diagnostics by kind (`unexpected`, `missing`).
    pub diagnostics_by_kind: BTreeMap<String, usize>,

    /// `%` blocks by lowercase name (e.g. "scf", "pal").
    pub blocks_by_name: BTreeMap<String, usize>,

    pub geometries: usize,
    pub atoms: usize,

    pub graph_nodes: usize,
    pub graph_edges: usize,
}

/// Millisecond timings for major pipeline phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingsMs {
    pub scan: u128,
    pub parse_extract: u128,
    pub graph_build: u128,
    pub total: u128,
}

impl PipelineSummary {
    /// Build a summary from current counts only (timings default to zero).
    pub fn from_counts(
        scan: &ScanResult,
        documents: &[InputDocument],
        diagnostics: &[Diagnostic],
        graph: &Graph<GraphNode, GraphEdgeLabel>,
    ) -> Self {
        let generated_at: DateTime<Utc> = Utc::now();

        let mut diagnostics_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for d in diagnostics {
            let key = match d.kind {
                DiagnosticKind::Unexpected => "unexpected",
                DiagnosticKind::Missing => "missing",
            };
            *diagnostics_by_kind.entry(key.to_string()).or_insert(0) += 1;
        }

        let mut blocks_by_name: BTreeMap<String, usize> = BTreeMap::new();
        for b in documents.iter().flat_map(|d| &d.blocks) {
            *blocks_by_name.entry(b.name.to_ascii_lowercase()).or_insert(0) += 1;
        }

        let counts = Counts {
            files_scanned: scan.files.len(),
            files_skipped_ignored: scan.skipped_ignored,
            files_skipped_too_big: scan.skipped_too_big,
            documents: documents.len(),
            documents_with_errors: documents.iter().filter(|d| d.has_error()).count(),
            diagnostics_by_kind,
            blocks_by_name,
            geometries: documents.iter().map(|d| d.geometries.len()).sum(),
            atoms: documents.iter().map(InputDocument::atom_count).sum(),
            graph_nodes: graph.node_count(),
            graph_edges: graph.edge_count(),
        };

        Self {
            generated_at: generated_at.to_rfc3339(),
            counts,
            timings_ms: TimingsMs::default(),
        }
    }

    /// Attach timings captured by a [`SummaryStopwatch`].
    pub fn with_timings(mut self, timings: TimingsMs) -> Self {
        self.timings_ms = timings;
        self
    }
}

/// Simple stopwatch to measure pipeline phases.
#[derive(Debug, Clone)]
pub struct SummaryStopwatch {
    started: Instant,
    last_mark: Instant,
    tm: TimingsMs,
}

impl SummaryStopwatch {
    #[inline]
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_mark: now,
            tm: TimingsMs::default(),
        }
    }

    #[inline]
    pub fn stop_scan(&mut self) -> &mut Self {
        self.tm.scan = self.since_mark_ms();
        self
    }

    #[inline]
    pub fn stop_parse_extract(&mut self) -> &mut Self {
        self.tm.parse_extract = self.since_mark_ms();
        self
    }

    #[inline]
    pub fn stop_graph_build(&mut self) -> &mut Self {
        self.tm.graph_build = self.since_mark_ms();
        self
    }

    /// Finish and compute `total`.
    #[inline]
    pub fn into_timings(mut self) -> TimingsMs {
        self.tm.total = as_millis(self.started.elapsed());
        self.tm
    }

    /// Time since the last mark in milliseconds; updates the mark.
    #[inline]
    fn since_mark_ms(&mut self) -> u128 {
        let now = Instant::now();
        let d = now.duration_since(self.last_mark);
        self.last_mark = now;
        as_millis(d)
    }
}

#[inline]
fn as_millis(d: Duration) -> u128 {
    (d.as_secs() as u128)
        .saturating_mul(1_000)
        .saturating_add((d.subsec_nanos() as u128) / 1_000_000)
}
