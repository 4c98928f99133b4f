//! Normalization helpers for paths, extensions, and glob handling.
//!
//! Paths written to artifacts are always relative to the indexed root and use
//! `/` separators, so the output does not depend on the machine it ran on.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Component, Path};

/// Convert `p` into a root-relative string with stable `/` separators.
///
/// # Example
/// ```
/// use std::path::Path;
/// use orca_index::core::normalize::normalize_repo_rel_str;
///
/// let rel = normalize_repo_rel_str(Path::new("/data/calcs"), Path::new("/data/calcs/h2o/opt.inp"));
/// assert_eq!(rel, "h2o/opt.inp");
/// ```
pub fn normalize_repo_rel_str(root: &Path, p: &Path) -> String {
    let root_abs = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let abs = dunce::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root_abs.join(p)
        }
    });

    let rel = abs
        .strip_prefix(&root_abs)
        .or_else(|_| p.strip_prefix(root))
        .unwrap_or(&abs);

    to_unix_sep(&rel.to_string_lossy())
}

/// Replace OS-specific separators with `/`.
///
/// # Example
/// ```
/// use orca_index::core::normalize::to_unix_sep;
///
/// assert_eq!(to_unix_sep(r"h2o\opt.inp"), "h2o/opt.inp");
/// ```
pub fn to_unix_sep<S: AsRef<str>>(s: S) -> String {
    s.as_ref().replace('\\', "/")
}

/// Resolve a file name written inside the document at `doc_rel` against the
/// document's directory, lexically (`..` and `.` are folded, nothing touches
/// the filesystem). Absolute references are kept as they are.
///
/// # Example
/// ```
/// use orca_index::core::normalize::resolve_reference;
///
/// assert_eq!(resolve_reference("h2o/opt.inp", "geom.xyz"), "h2o/geom.xyz");
/// assert_eq!(resolve_reference("h2o/opt.inp", "../shared/guess.gbw"), "shared/guess.gbw");
/// ```
pub fn resolve_reference(doc_rel: &str, reference: &str) -> String {
    let reference = to_unix_sep(reference);
    if Path::new(&reference).is_absolute() {
        return reference;
    }
    let base = Path::new(doc_rel).parent().unwrap_or(Path::new(""));
    let mut parts: Vec<String> = Vec::new();
    for comp in base.join(&reference).components() {
        match comp {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    parts.push("..".into());
                }
            }
            _ => {}
        }
    }
    parts.join("/")
}

/// Whether `path` has one of `extensions` (case-insensitive, no dots).
///
/// # Example
/// ```
/// use std::path::Path;
/// use orca_index::core::normalize::has_input_extension;
///
/// let exts = vec!["inp".to_string()];
/// assert!(has_input_extension(Path::new("opt.INP"), &exts));
/// assert!(!has_input_extension(Path::new("opt.out"), &exts));
/// ```
pub fn has_input_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// Build a [`GlobSet`] from patterns, skipping invalid or empty ones.
///
/// Returns `None` if the input list is empty or all patterns are invalid.
///
/// # Example
/// ```
/// use orca_index::core::normalize::build_globset;
///
/// let gs = build_globset(&vec!["**/scratch/**".to_string()]).unwrap();
/// assert!(gs.is_match("runs/scratch/opt.inp"));
/// ```
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        if let Ok(g) = Glob::new(pat) {
            builder.add(g);
        }
    }
    builder.build().ok()
}

/// Return `true` if a path matches the ignore glob set.
pub fn is_ignored_by(path: &Path, set: Option<&GlobSet>) -> bool {
    set.is_some_and(|gs| gs.is_match(to_unix_sep(path.to_string_lossy())))
}

/// A quoted setting value that names a file: `"guess.gbw"` → `guess.gbw`.
///
/// The unquoted text must have an extension and no whitespace.
pub fn quoted_file_name(value: &str) -> Option<&str> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() || inner.contains(char::is_whitespace) {
        return None;
    }
    Path::new(inner).extension()?;
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_stay_inside_the_root_when_possible() {
        assert_eq!(resolve_reference("opt.inp", "a.xyz"), "a.xyz");
        assert_eq!(resolve_reference("a/b/opt.inp", "./c/../d.xyz"), "a/b/d.xyz");
        assert_eq!(resolve_reference("opt.inp", "../outside.xyz"), "../outside.xyz");
        assert_eq!(resolve_reference("a/opt.inp", r"sub\g.xyz"), "a/sub/g.xyz");
    }

    #[test]
    fn quoted_file_names() {
        assert_eq!(quoted_file_name("\"guess.gbw\""), Some("guess.gbw"));
        assert_eq!(quoted_file_name("\"guess\""), None);
        assert_eq!(quoted_file_name("guess.gbw"), None);
        assert_eq!(quoted_file_name("\"my guess.gbw\""), None);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("h2o");
        std::fs::create_dir_all(&nested).unwrap();
        let file = nested.join("opt.inp");
        std::fs::write(&file, "! Opt\n").unwrap();
        assert_eq!(normalize_repo_rel_str(dir.path(), &file), "h2o/opt.inp");
    }
}
