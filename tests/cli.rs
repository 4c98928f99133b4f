use std::fs;
use std::process::Command;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_orca-input"));
    cmd.env("NO_COLOR", "1").env("RUST_LOG", "off");
    cmd
}

#[test]
fn parse_prints_the_sexp() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("opt.inp");
    fs::write(&file, "! Opt\n%maxcore 100\n").unwrap();

    let out = bin().arg("parse").arg(&file).output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        "(source_file (simple_line (arg)) (input_line (input_title (word)) (float)))"
    );
}

#[test]
fn check_reports_errors_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.inp");
    let bad = dir.path().join("bad.inp");
    fs::write(&good, "! Opt\n").unwrap();
    fs::write(&bad, "! Opt\n%scf\n  MaxIter 10\n").unwrap();

    let out = bin().arg("check").arg(&good).arg(&bad).output().unwrap();
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ok"), "{stdout}");
    assert!(stdout.contains("missing `end`"), "{stdout}");
    assert!(stdout.contains("2 file(s) checked, 1 with errors"), "{stdout}");

    let ok = bin().arg("check").arg(&good).output().unwrap();
    assert!(ok.status.success());
}

#[test]
fn index_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.inp"), "! Opt\n*xyzfile 0 1 a.xyz\n").unwrap();

    let out = bin()
        .arg("index")
        .arg(dir.path())
        .arg("--out")
        .arg(out_dir.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let run = fs::read_dir(out_dir.path()).unwrap().next().unwrap().unwrap().path();
    for name in ["documents.jsonl", "diagnostics.jsonl", "graph.graphml", "summary.json"] {
        assert!(run.join(name).is_file(), "{name} missing");
    }
}
