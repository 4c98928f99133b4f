//! Syntax tree → [`InputDocument`] extraction.
//!
//! Walks the named nodes of a parsed input and collects keywords, sections,
//! variables and geometries. Recovered `ERROR`/`MISSING` nodes become
//! [`Diagnostic`]s; everything around them is still extracted.

use crate::{
    config::model::IndexConfig,
    core::ids::{hash_content, node_id},
    model::{
        diagnostic::{Diagnostic, DiagnosticKind},
        document::{Body, InputBlock, InputDocument, Setting, Subblock, Variable, VariableValue},
        geometry::{Atom, Coordinate, CoordinateForm, Geometry, GeometrySource},
        graph::GraphNodeKind,
        span::Span,
    },
};
use tree_sitter_orca::{Node, NodeKind, Tree};
use tracing::{debug, warn};

/// Longest excerpt of unexpected text quoted in a diagnostic message.
const MAX_MESSAGE_TEXT: usize = 40;

/// Extract the document and its diagnostics from a parsed file.
pub fn extract_document(
    rel_path: &str,
    tree: &Tree,
    cfg: &IndexConfig,
) -> (InputDocument, Vec<Diagnostic>) {
    let source = tree.source();
    let mut doc = InputDocument {
        id: node_id(GraphNodeKind::Document, rel_path),
        path: rel_path.to_string(),
        content_hash: hash_content(source.as_bytes()),
        bytes: source.len(),
        keywords: Vec::new(),
        settings: Vec::new(),
        blocks: Vec::new(),
        geometries: Vec::new(),
        diagnostics: 0,
    };

    for item in tree.root_node().named_children() {
        match item.node_kind() {
            NodeKind::SimpleLine => doc.keywords.extend(
                item.named_children()
                    .filter(|n| n.node_kind() == NodeKind::Arg)
                    .map(|n| n.utf8_text().to_string()),
            ),
            NodeKind::InputLine => {
                if let Some(setting) = input_line(item) {
                    doc.settings.push(setting);
                }
            }
            NodeKind::InputBlock => doc.blocks.push(input_block(item, cfg)),
            NodeKind::GeomBlock | NodeKind::GeomLine => {
                if let Some(geom) = geometry(item) {
                    doc.geometries.push(geom);
                }
            }
            _ => {}
        }
    }

    let diagnostics = diagnostics(rel_path, tree, cfg);
    doc.diagnostics = tree.error_nodes().len();
    debug!(
        path = rel_path,
        blocks = doc.blocks.len(),
        geometries = doc.geometries.len(),
        diagnostics = doc.diagnostics,
        "extract: document"
    );
    (doc, diagnostics)
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

fn title(node: Node<'_>) -> String {
    node.child_of_kind(NodeKind::InputTitle)
        .and_then(|t| t.child_of_kind(NodeKind::Word))
        .map(|w| w.utf8_text().to_string())
        .unwrap_or_default()
}

/// `end` (or `*`) present and not inserted by recovery.
fn is_closed(node: Node<'_>, closer: NodeKind) -> bool {
    node.child_of_kind(closer).is_some_and(|n| !n.is_missing())
}

fn number(node: Node<'_>) -> Option<f64> {
    node.utf8_text().parse().ok()
}

fn input_line(node: Node<'_>) -> Option<Setting> {
    let value = node
        .named_children()
        .find(|n| matches!(n.node_kind(), NodeKind::Float | NodeKind::QuotedString))?;
    Some(Setting {
        key: title(node),
        values: vec![value.utf8_text().to_string()],
        line: line_of(node),
    })
}

fn input_block(node: Node<'_>, cfg: &IndexConfig) -> InputBlock {
    let mut body = Body::default();
    if let Some(b) = node.child_of_kind(NodeKind::InputBody) {
        collect_body(b, &mut body, cfg);
    }
    InputBlock {
        name: title(node),
        body,
        closed: is_closed(node, NodeKind::End),
        span: Span::of(node),
    }
}

fn collect_body(node: Node<'_>, body: &mut Body, cfg: &IndexConfig) {
    for item in node.named_children() {
        match item.node_kind() {
            NodeKind::KvPair => body.settings.push(kv_pair(item)),
            NodeKind::VariableDef => {
                if let Some(var) = variable(item) {
                    body.variables.push(var);
                }
            }
            NodeKind::Subblock => body.subblocks.push(subblock(item, cfg)),
            NodeKind::RawContent if cfg.extract.keep_raw_content => {
                body.raw.push(item.utf8_text().to_string())
            }
            _ => {}
        }
    }
}

fn kv_pair(node: Node<'_>) -> Setting {
    let key = node
        .child_of_kind(NodeKind::InputKey)
        .map(|k| k.utf8_text().to_string())
        .unwrap_or_default();
    let values = node
        .child_of_kind(NodeKind::Value)
        .map(|v| {
            v.named_children()
                .filter(|a| a.node_kind() == NodeKind::ValueAtom)
                .map(|a| a.utf8_text().to_string())
                .collect()
        })
        .unwrap_or_default();
    Setting {
        key,
        values,
        line: line_of(node),
    }
}

fn subblock(node: Node<'_>, cfg: &IndexConfig) -> Subblock {
    let mut body = Body::default();
    for child in node.named_children() {
        if child.node_kind() == NodeKind::InputBody {
            collect_body(child, &mut body, cfg);
        } else if let Some(atom) = atom(child) {
            body.atoms.push(atom);
        }
    }
    Subblock {
        name: node
            .child_by_field_name("name")
            .map(|n| n.utf8_text().to_string())
            .unwrap_or_default(),
        body,
        closed: is_closed(node, NodeKind::End),
        line: line_of(node),
    }
}

fn variable(node: Node<'_>) -> Option<Variable> {
    let name = node.child_of_kind(NodeKind::VariableName)?.utf8_text().to_string();
    let value = if let Some(range) = node.child_of_kind(NodeKind::VariableRange) {
        let v: Vec<f64> = range.named_children().filter_map(number).collect();
        let &[start, end, steps] = v.as_slice() else {
            return None;
        };
        VariableValue::Range { start, end, steps }
    } else if let Some(array) = node.child_of_kind(NodeKind::VariableArray) {
        VariableValue::List {
            values: array.named_children().filter_map(number).collect(),
        }
    } else {
        let scalar = node
            .named_children()
            .find(|n| matches!(n.node_kind(), NodeKind::Float | NodeKind::Integer))?;
        VariableValue::Scalar {
            value: number(scalar)?,
        }
    };
    Some(Variable {
        name,
        value,
        line: line_of(node),
    })
}

fn atom(line: Node<'_>) -> Option<Atom> {
    if !matches!(
        line.node_kind(),
        NodeKind::XyzLine
            | NodeKind::IntLine
            | NodeKind::ZmatLine1
            | NodeKind::ZmatLine2
            | NodeKind::ZmatLine3
            | NodeKind::ZmatLine4
    ) {
        return None;
    }
    let element = line.child_of_kind(NodeKind::Element)?.utf8_text().to_string();
    let mut refs = Vec::new();
    let mut coords = Vec::new();
    for (i, child) in line.children().enumerate() {
        if line.field_name_for_child(i).is_some() {
            let text = child.utf8_text();
            let Ok(r) = text.parse::<u32>() else {
                warn!(line = line_of(line), reference = text, "skipping atom with a non-numeric reference");
                return None;
            };
            refs.push(r);
        } else if child.node_kind() == NodeKind::CoordValue {
            coords.extend(coordinate(child));
        }
    }
    Some(Atom {
        element,
        refs,
        coords,
        line: line_of(line),
    })
}

fn coordinate(node: Node<'_>) -> Option<Coordinate> {
    let inner = node.named_child(0)?;
    match inner.node_kind() {
        NodeKind::VariableRef => inner
            .child_of_kind(NodeKind::VariableName)
            .map(|n| Coordinate::Variable(n.utf8_text().to_string())),
        _ => number(inner).map(Coordinate::Value),
    }
}

fn geometry(node: Node<'_>) -> Option<Geometry> {
    let keyword = match node.node_kind() {
        NodeKind::GeomLine => node.child_of_kind(NodeKind::GeomLineTypes)?,
        _ => node
            .children()
            .find(|n| matches!(n.node_kind(), NodeKind::Xyz | NodeKind::Int | NodeKind::Gzmt))?,
    };
    let form = CoordinateForm::from_keyword(keyword.utf8_text())?;
    let mut ints = node
        .named_children()
        .filter(|n| n.node_kind() == NodeKind::Integer)
        .map(|n| n.utf8_text().parse::<i64>().unwrap_or(0));
    let charge = ints.next().unwrap_or(0);
    let multiplicity = ints.next().unwrap_or(1);

    let source = match node.child_of_kind(NodeKind::File) {
        Some(file) => GeometrySource::File {
            path: file.utf8_text().to_string(),
        },
        None => GeometrySource::Inline {
            atoms: node.named_children().filter_map(atom).collect(),
        },
    };
    Some(Geometry {
        form,
        charge,
        multiplicity,
        source,
        span: Span::of(node),
    })
}

fn diagnostics(rel_path: &str, tree: &Tree, cfg: &IndexConfig) -> Vec<Diagnostic> {
    let limit = match cfg.limits.max_diagnostics_per_file {
        0 => usize::MAX,
        n => n,
    };
    tree.error_nodes()
        .into_iter()
        .take(limit)
        .map(|node| {
            let (kind, message) = if node.is_missing() {
                (DiagnosticKind::Missing, format!("missing `{}`", node.kind()))
            } else {
                (
                    DiagnosticKind::Unexpected,
                    format!("unexpected `{}`", excerpt(node.utf8_text())),
                )
            };
            let span = Span::of(node);
            Diagnostic {
                file: rel_path.to_string(),
                kind,
                message,
                span,
                snippet: span.lines_with_context(tree.source(), cfg.limits.snippet_context_lines),
            }
        })
        .collect()
}

fn excerpt(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() > MAX_MESSAGE_TEXT {
        let cut: String = line.chars().take(MAX_MESSAGE_TEXT).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> (InputDocument, Vec<Diagnostic>) {
        let tree = tree_sitter_orca::parse(text).unwrap();
        extract_document("calc/opt.inp", &tree, &IndexConfig::default())
    }

    #[test]
    fn keywords_and_one_line_inputs() {
        let (doc, diags) = extract("! B3LYP def2-SVP Opt\n%maxcore 3000\n%moinp \"guess.gbw\"\n");
        assert!(diags.is_empty());
        assert_eq!(doc.keywords, vec!["B3LYP", "def2-SVP", "Opt"]);
        let keys: Vec<(&str, &str)> = doc
            .settings
            .iter()
            .map(|s| (s.key.as_str(), s.values[0].as_str()))
            .collect();
        assert_eq!(keys, vec![("maxcore", "3000"), ("moinp", "\"guess.gbw\"")]);
        assert_eq!(doc.settings[1].line, 3);
    }

    #[test]
    fn blocks_with_settings_variables_and_subblocks() {
        let text = "\
%paras
  R = 1.0, 1.5, 5;
  A [90.0 100.0]
  B = 2
end
%basis
  NewGTO
    S 1
  end
end
%method
  Grid = 4, 5
end
";
        let (doc, _) = extract(text);
        let paras = doc.block("PARAS").unwrap();
        assert!(paras.closed);
        assert_eq!(
            paras.body.variables.iter().map(|v| v.value.clone()).collect::<Vec<_>>(),
            vec![
                VariableValue::Range { start: 1.0, end: 1.5, steps: 5.0 },
                VariableValue::List { values: vec![90.0, 100.0] },
                VariableValue::Scalar { value: 2.0 },
            ]
        );
        let gto = doc.block("basis").unwrap().body.subblock("newgto").unwrap();
        assert_eq!(gto.body.setting("S").unwrap().values, vec!["1"]);
        let grid = doc.block("method").unwrap().body.setting("grid").unwrap();
        assert_eq!(grid.values, vec!["4", "5"]);
    }

    #[test]
    fn inline_geometry_with_variables() {
        let text = "* xyz -1 2\nO 0.0 0.0 0.0\nH 0.0 0.0 {R}\n*\n";
        let (doc, _) = extract(text);
        let geom = &doc.geometries[0];
        assert_eq!(geom.form, CoordinateForm::Cartesian);
        assert_eq!((geom.charge, geom.multiplicity), (-1, 2));
        let GeometrySource::Inline { atoms } = &geom.source else {
            panic!("expected inline atoms");
        };
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[1].coords[2], Coordinate::Variable("R".into()));
        assert_eq!(atoms[1].line, 3);
        assert_eq!(doc.atom_count(), 2);
    }

    #[test]
    fn zmatrix_connectivity_is_kept() {
        let (doc, _) = extract("* gzmt 0 1\nO\nH 1 0.96\nH 1 0.96 2 104.5\n*\n");
        let GeometrySource::Inline { atoms } = &doc.geometries[0].source else {
            panic!("expected inline atoms");
        };
        let refs: Vec<Vec<u32>> = atoms.iter().map(|a| a.refs.clone()).collect();
        assert_eq!(refs, vec![vec![], vec![1], vec![1, 2]]);
        assert_eq!(doc.geometries[0].form, CoordinateForm::Zmatrix);
    }

    #[test]
    fn atoms_with_non_numeric_references_are_skipped() {
        let (doc, _) = extract("* gzmt 0 1\nO\nH 1 0.96\nH 1-2 0.96\n*\n");
        let GeometrySource::Inline { atoms } = &doc.geometries[0].source else {
            panic!("expected inline atoms");
        };
        let lines: Vec<usize> = atoms.iter().map(|a| a.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(atoms.iter().all(|a| !a.refs.contains(&0)));
    }

    #[test]
    fn geometry_file_reference() {
        let (doc, _) = extract("*xyzfile 0 1 water.xyz\n");
        assert_eq!(doc.geometries[0].file(), Some("water.xyz"));
        assert_eq!(doc.geometries[0].atom_count(), 0);
    }

    #[test]
    fn coordinate_subblocks_count_atoms() {
        let text = "%coords\n  coords\n    O 0.0 0.0 0.0\n    H 0.0 0.7 0.5\n  end\nend\n";
        let (doc, _) = extract(text);
        assert_eq!(doc.atom_count(), 2);
    }

    #[test]
    fn recovery_nodes_become_diagnostics() {
        let (doc, diags) = extract("! Opt\n@@@ nonsense\n%scf\n  MaxIter 100\n");
        assert_eq!(doc.diagnostics, 2);
        assert!(doc.has_error());
        assert_eq!(diags[0].kind, DiagnosticKind::Unexpected);
        assert_eq!(diags[0].message, "unexpected `@@@ nonsense`");
        assert_eq!((diags[0].span.start_line, diags[0].span.start_column), (2, 1));
        assert_eq!(diags[0].snippet, "! Opt\n@@@ nonsense\n%scf");
        assert_eq!(diags[1].kind, DiagnosticKind::Missing);
        assert_eq!(diags[1].message, "missing `end`");
        assert!(!doc.block("scf").unwrap().closed);
        let span = diags[1].span;
        assert_eq!(
            diags[1].to_string(),
            format!("calc/opt.inp:{}:{}: missing `end`", span.start_line, span.start_column)
        );
    }

    #[test]
    fn diagnostics_respect_the_per_file_limit() {
        let tree = tree_sitter_orca::parse("@1\n@2\n@3\n").unwrap();
        let mut cfg = IndexConfig::default();
        cfg.limits.max_diagnostics_per_file = 2;
        let (doc, diags) = extract_document("x.inp", &tree, &cfg);
        assert_eq!(diags.len(), 2);
        assert_eq!(doc.diagnostics, 3);
    }

    #[test]
    fn documents_are_identified_by_path() {
        let (a, _) = extract("! Opt\n");
        let (b, _) = extract("! SP\n");
        assert_eq!(a.id, b.id);
        assert_ne!(a.content_hash, b.content_hash);
    }
}
