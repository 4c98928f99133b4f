//! GraphML exporter for Gephi and similar tools.
//!
//! Nodes carry their kind and path, edges their label.

use crate::model::graph::{GraphEdgeLabel, GraphNode};
use anyhow::{Context, Result, anyhow};
use petgraph::graph::Graph;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// Write GraphML to `path`.
pub fn write_graphml(path: &Path, graph: &Graph<GraphNode, GraphEdgeLabel>) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    render(&mut w, graph)?;
    w.flush()?;
    info!("graphml: wrote -> {}", path.display());
    Ok(())
}

fn render(w: &mut impl Write, graph: &Graph<GraphNode, GraphEdgeLabel>) -> Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns
     http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;

    writeln!(w, r#"<key id="d0" for="node" attr.name="path" attr.type="string"/>"#)?;
    writeln!(w, r#"<key id="d1" for="node" attr.name="kind" attr.type="string"/>"#)?;
    writeln!(w, r#"<key id="d2" for="node" attr.name="uuid" attr.type="string"/>"#)?;
    writeln!(w, r#"<key id="e0" for="edge" attr.name="label" attr.type="string"/>"#)?;

    writeln!(w, r#"<graph edgedefault="directed">"#)?;

    // Node indices are dense (nothing is removed), so `n{index}` is stable.
    for nidx in graph.node_indices() {
        let n = &graph[nidx];
        writeln!(w, r#"<node id="n{}">"#, nidx.index())?;
        writeln!(w, r#"  <data key="d0">{}</data>"#, xml_escape(&n.path))?;
        writeln!(w, r#"  <data key="d1">{}</data>"#, n.kind)?;
        writeln!(w, r#"  <data key="d2">{}</data>"#, n.id)?;
        writeln!(w, r#"</node>"#)?;
    }

    for eidx in graph.edge_indices() {
        let (src, dst) = graph
            .edge_endpoints(eidx)
            .ok_or_else(|| anyhow!("graphml: dangling edge {}", eidx.index()))?;
        writeln!(
            w,
            r#"<edge id="e{}" source="n{}" target="n{}">"#,
            eidx.index(),
            src.index(),
            dst.index()
        )?;
        writeln!(w, r#"  <data key="e0">{}</data>"#, graph[eidx])?;
        writeln!(w, r#"</edge>"#)?;
    }

    writeln!(w, r#"</graph>"#)?;
    writeln!(w, r#"</graphml>"#)?;
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
