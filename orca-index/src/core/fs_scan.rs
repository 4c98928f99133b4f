//! Filesystem scanning for ORCA input files.

use crate::{
    config::model::IndexConfig,
    core::normalize::{build_globset, has_input_extension, is_ignored_by, normalize_repo_rel_str},
};
use anyhow::{Result, bail};
use globset::GlobSet;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Root-relative path with `/` separators.
    pub rel_path: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub root: PathBuf,
    pub files: Vec<ScannedFile>,
    pub skipped_ignored: usize,
    pub skipped_too_big: usize,
}

pub fn scan_repo(root: &Path, cfg: &IndexConfig) -> Result<ScanResult> {
    if !root.exists() {
        bail!("fs_scan: root does not exist: {}", root.display());
    }

    info!("fs_scan: start -> {}", root.display());

    let ignore_globs: Option<GlobSet> = build_globset(&cfg.filters.ignore_globs);

    let mut skipped_ignored = 0usize;
    let mut skipped_too_big = 0usize;

    let mut files = Vec::<ScannedFile>::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_input_extension(path, &cfg.filters.extensions) {
            continue;
        }

        if is_ignored_by(path, ignore_globs.as_ref()) {
            skipped_ignored += 1;
            debug!("fs_scan: ignore (glob) {}", path.display());
            continue;
        }

        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                warn!("fs_scan: metadata failed for {}: {}", path.display(), err);
                continue;
            }
        };
        let size = meta.len();
        if size as usize > cfg.limits.max_file_bytes {
            skipped_too_big += 1;
            debug!(
                "fs_scan: skip (size {} > max {}) {}",
                size,
                cfg.limits.max_file_bytes,
                path.display()
            );
            continue;
        }

        files.push(ScannedFile {
            path: path.to_path_buf(),
            rel_path: normalize_repo_rel_str(root, path),
            size,
        });
    }

    info!(
        "fs_scan: done, total={} (ignored={}, too_big={})",
        files.len(),
        skipped_ignored,
        skipped_too_big
    );
    if files.is_empty() {
        warn!(
            "fs_scan: no input files with extensions {:?} under {}",
            cfg.filters.extensions,
            root.display()
        );
    }

    Ok(ScanResult {
        root: root.to_path_buf(),
        files,
        skipped_ignored,
        skipped_too_big,
    })
}

/// Coarse directory filter to avoid descending into heavy folders early.
fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() > 0 && entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            return !matches!(name, ".git" | "target" | ".orca-index" | ".idea" | ".vscode");
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str, body: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    #[test]
    fn keeps_inputs_and_applies_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "b/opt.inp", "! Opt\n");
        touch(root, "a/sp.orca", "! SP\n");
        touch(root, "a/sp.out", "ORCA output\n");
        touch(root, ".git/hooks/x.inp", "! Opt\n");
        touch(root, "scratch/tmp.inp", "! Opt\n");
        touch(root, "big.inp", &"#".repeat(64));

        let mut cfg = IndexConfig::default();
        cfg.filters.ignore_globs.push("**/scratch/**".into());
        cfg.limits.max_file_bytes = 32;

        let scan = scan_repo(root, &cfg).unwrap();
        let rels: Vec<&str> = scan.files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(rels, vec!["a/sp.orca", "b/opt.inp"]);
        assert_eq!(scan.skipped_ignored, 1);
        assert_eq!(scan.skipped_too_big, 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(scan_repo(&gone, &IndexConfig::default()).is_err());
    }
}
