use orca_index::{IndexConfig, InputDocument, index_directory, index_directory_with};
use serde_json::Value;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

fn fixture(root: &Path) {
    write(
        root,
        "water/opt.inp",
        "\
! B3LYP def2-SVP Opt
%pal nprocs 4 end
* xyz 0 1
O 0.0 0.0 0.0
H 0.0 0.757 0.586
H 0.0 -0.757 0.586
*
",
    );
    write(
        root,
        "water/freq.inp",
        "! B3LYP def2-SVP Freq\n%moinp \"opt.gbw\"\n*xyzfile 0 1 opt.xyz\n",
    );
    write(root, "broken/scf.inp", "! HF\n%scf\n  MaxIter 10\n");
    write(root, "water/opt.out", "not an input\n");
}

#[test]
fn indexes_a_directory_and_writes_all_artifacts() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());

    let persisted = index_directory(src.path(), out.path()).unwrap();
    let counts = &persisted.summary.counts;
    assert_eq!(counts.files_scanned, 3);
    assert_eq!(counts.documents, 3);
    assert_eq!(counts.documents_with_errors, 1);
    assert_eq!(counts.diagnostics_by_kind.get("missing"), Some(&1));
    assert_eq!(counts.blocks_by_name.get("pal"), Some(&1));
    assert_eq!(counts.atoms, 3);
    assert_eq!(counts.geometries, 2);
    assert_eq!(persisted.edge_labels.get("reads_geometry"), Some(&1));
    assert_eq!(persisted.edge_labels.get("reads_file"), Some(&1));

    let docs: Vec<InputDocument> = fs::read_to_string(&persisted.files.documents_jsonl)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["broken/scf.inp", "water/freq.inp", "water/opt.inp"]);
    assert_eq!(docs[2].keywords, vec!["B3LYP", "def2-SVP", "Opt"]);

    let diags: Vec<Value> = fs::read_to_string(&persisted.files.diagnostics_jsonl)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0]["file"], "broken/scf.inp");
    assert_eq!(diags[0]["kind"], "missing");

    let graphml = fs::read_to_string(&persisted.files.graph_graphml).unwrap();
    assert!(graphml.contains("water/opt.xyz"));
    assert!(graphml.contains("water/opt.gbw"));

    let summary: Value =
        serde_json::from_str(&fs::read_to_string(&persisted.files.summary_json).unwrap()).unwrap();
    assert_eq!(summary["summary"]["counts"]["documents"], 3);
    assert!(Path::new(&persisted.out_dir).starts_with(out.path()));
}

#[test]
fn back_to_back_runs_keep_separate_directories() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());

    let cfg = IndexConfig::default();
    let first = index_directory_with(src.path(), out.path(), &cfg).unwrap();
    let second = index_directory_with(src.path(), out.path(), &cfg).unwrap();
    assert_ne!(first.out_dir, second.out_dir);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 2);
    assert!(Path::new(&first.files.summary_json).is_file());
}

#[test]
fn explicit_config_limits_extensions() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(src.path(), "extra/sp.orca", "! SP\n");

    let mut cfg = IndexConfig::default();
    cfg.filters.extensions = vec!["orca".into()];
    let persisted = index_directory_with(src.path(), out.path(), &cfg).unwrap();
    assert_eq!(persisted.summary.counts.documents, 1);
    assert_eq!(persisted.summary.counts.graph_edges, 0);
}

#[test]
fn config_file_in_root_is_honoured() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    fixture(src.path());
    write(src.path(), ".orcaindex.yml", "filters:\n  ignore_globs: [\"**/broken/**\"]\n");

    let persisted = index_directory(src.path(), out.path()).unwrap();
    assert_eq!(persisted.summary.counts.documents, 2);
    assert_eq!(persisted.summary.counts.files_skipped_ignored, 1);
    assert_eq!(persisted.summary.counts.documents_with_errors, 0);
}

#[test]
fn invalid_config_is_rejected() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut cfg = IndexConfig::default();
    cfg.limits.max_file_bytes = 0;
    assert!(index_directory_with(src.path(), out.path(), &cfg).is_err());
}
