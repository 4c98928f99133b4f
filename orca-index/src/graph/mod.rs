//! Reference graph between input documents and the files they read.
//!
//! Heuristics:
//! - Every indexed document is a node;
//! - `ReadsGeometry`: document → coordinate file of `*xyzfile` / `*gzmtfile`;
//! - `ReadsFile`: document → file named by a quoted setting value
//!   (`%moinp "guess.gbw"`, `InHessName "freq.hess"`), when enabled;
//! - References are resolved against the document's directory. A target that
//!   is itself an indexed document links to that node, otherwise an
//!   `External` node is created once per path.

use crate::{
    config::model::IndexConfig,
    core::{
        ids::node_id,
        normalize::{quoted_file_name, resolve_reference},
    },
    model::{
        document::{Body, InputDocument},
        graph::{GraphEdgeLabel, GraphNode, GraphNodeKind},
    },
};
use anyhow::Result;
use petgraph::graph::{Graph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

/// Build the document reference graph. No IO required.
#[tracing::instrument(level = "info", skip_all, fields(documents = documents.len()))]
pub fn build_reference_graph(
    documents: &[InputDocument],
    cfg: &IndexConfig,
) -> Result<Graph<GraphNode, GraphEdgeLabel>> {
    let mut g: Graph<GraphNode, GraphEdgeLabel> = Graph::new();
    let mut idx_by_path: HashMap<String, NodeIndex> = HashMap::new();

    for d in documents {
        let i = g.add_node(GraphNode {
            id: d.id.clone(),
            kind: GraphNodeKind::Document,
            path: d.path.clone(),
        });
        idx_by_path.insert(d.path.clone(), i);
    }

    for d in documents {
        let src = idx_by_path[&d.path];
        let mut refs: Vec<(String, GraphEdgeLabel)> = d
            .geometries
            .iter()
            .filter_map(|geom| geom.file())
            .map(|f| (f.to_string(), GraphEdgeLabel::ReadsGeometry))
            .collect();
        if cfg.extract.link_quoted_files {
            let quoted = d
                .settings
                .iter()
                .flat_map(|s| &s.values)
                .chain(d.blocks.iter().flat_map(|b| body_values(&b.body)))
                .filter_map(|v| quoted_file_name(v))
                .map(|f| (f.to_string(), GraphEdgeLabel::ReadsFile));
            refs.extend(quoted);
        }

        for (reference, label) in refs {
            let target = resolve_reference(&d.path, &reference);
            let dst = *idx_by_path.entry(target.clone()).or_insert_with(|| {
                g.add_node(GraphNode {
                    id: node_id(GraphNodeKind::External, &target),
                    kind: GraphNodeKind::External,
                    path: target.clone(),
                })
            });
            if g.find_edge(src, dst).is_some_and(|e| g[e] == label) {
                continue;
            }
            debug!("graph: {} -[{}]-> {}", d.path, label, target);
            g.add_edge(src, dst, label);
        }
    }

    Ok(g)
}

/// All setting values of a body, including nested subblocks.
fn body_values(body: &Body) -> Vec<&String> {
    let mut out: Vec<&String> = body.settings.iter().flat_map(|s| &s.values).collect();
    for sub in &body.subblocks {
        out.extend(body_values(&sub.body));
    }
    out
}
