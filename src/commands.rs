//! Subcommand handlers.
//!
//! Parsing is CPU-bound, so every file is parsed on the blocking pool; `check`
//! parses all of its files concurrently and reports them in argument order.

use crate::cli::{Command, TreeFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use orca_index::{Diagnostic, IndexConfig, core::debug_ast, core::extract::extract_document};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tree_sitter_orca::Tree;

/// Default output directory name for `index`, relative to the indexed root.
const DEFAULT_INDEX_DIR: &str = ".orca-index";

pub async fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Parse { file, format } => parse(file, format).await,
        Command::Highlight { file, json } => highlight(file, json).await,
        Command::Check { files } => check(files).await,
        Command::Index { root, out } => index(root, out).await,
    }
}

async fn parse_tree(path: PathBuf) -> Result<Tree> {
    tokio::task::spawn_blocking(move || {
        tree_sitter_orca::parse_file(&path).with_context(|| format!("parse {}", path.display()))
    })
    .await?
}

async fn parse(file: PathBuf, format: TreeFormat) -> Result<ExitCode> {
    let tree = parse_tree(file).await?;
    match format {
        TreeFormat::Sexp => println!("{}", tree.root_node().to_sexp()),
        TreeFormat::Json => println!("{}", serde_json::to_string_pretty(&tree.to_syntax_node())?),
        TreeFormat::Dump => print!("{}", debug_ast::dump_lines(&tree)),
    }
    Ok(exit_for(!tree.has_error()))
}

async fn highlight(file: PathBuf, json: bool) -> Result<ExitCode> {
    let tree = parse_tree(file).await?;
    for span in tree_sitter_orca::highlight(&tree) {
        if json {
            println!("{}", serde_json::to_string(&span)?);
        } else {
            let text = &tree.source()[span.start_byte..span.end_byte];
            println!("{}-{}\t{}\t{:?}", span.start, span.end, span.capture, text);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Outcome of checking one file.
struct FileReport {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

fn check_file(path: &Path) -> Result<FileReport> {
    let tree = tree_sitter_orca::parse_file(path)
        .with_context(|| format!("parse {}", path.display()))?;
    let config = IndexConfig::default();
    let (_, diagnostics) = extract_document(&path.display().to_string(), &tree, &config);
    Ok(FileReport {
        path: path.to_path_buf(),
        diagnostics,
    })
}

async fn check(files: Vec<PathBuf>) -> Result<ExitCode> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let shown = path.clone();
            (shown, tokio::task::spawn_blocking(move || check_file(&path)))
        })
        .collect();

    let total = handles.len();
    let mut failed = 0usize;
    for (path, handle) in handles {
        match handle.await? {
            Ok(report) if report.diagnostics.is_empty() => {
                debug!(path = %report.path.display(), "check: clean");
                println!("{} {}", "ok".green().bold(), report.path.display());
            }
            Ok(report) => {
                failed += 1;
                for d in &report.diagnostics {
                    print_diagnostic(d);
                }
            }
            Err(err) => {
                failed += 1;
                println!("{}: {} {:#}", path.display(), "error:".red().bold(), err);
            }
        }
    }

    let line = format!("{total} file(s) checked, {failed} with errors");
    if failed == 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.red());
    }
    Ok(exit_for(failed == 0))
}

fn print_diagnostic(d: &Diagnostic) {
    let location = format!("{}:{}:{}", d.file, d.span.start_line, d.span.start_column);
    println!("{}: {} {}", location.bold(), "error:".red().bold(), d.message);
    for line in d.snippet.lines() {
        println!("  {} {}", "|".blue(), line);
    }
}

async fn index(root: PathBuf, out: Option<PathBuf>) -> Result<ExitCode> {
    let out = out.unwrap_or_else(|| root.join(DEFAULT_INDEX_DIR));
    info!(root = %root.display(), out = %out.display(), "index: start");
    let persisted =
        tokio::task::spawn_blocking(move || orca_index::index_directory(&root, &out)).await??;

    let counts = &persisted.summary.counts;
    println!("{} {}", "indexed".green().bold(), persisted.out_dir);
    println!(
        "  {} documents ({} with errors), {} geometries, {} atoms, {} references",
        counts.documents,
        counts.documents_with_errors,
        counts.geometries,
        counts.atoms,
        counts.graph_edges
    );
    Ok(ExitCode::SUCCESS)
}

fn exit_for(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
