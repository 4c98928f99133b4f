//! Configuration data structures for the indexing pipeline.
//!
//! Groups:
//! - [`IndexConfig`]: top-level container for all config groups
//! - [`Filters`]: which files to include/exclude
//! - [`Limits`]: size limits (files, diagnostics, snippets)
//! - [`ExtractConfig`]: what to pull out of each parsed input
//!
//! All structs are `serde`-friendly so they can be loaded from YAML/JSON.
//! Missing fields fall back to their defaults.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Which files to include/exclude.
    pub filters: Filters,
    /// Size limits.
    pub limits: Limits,
    /// Extraction settings.
    pub extract: ExtractConfig,
}

impl IndexConfig {
    /// Validate config sanity (no degenerate or absurd values).
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_file_bytes == 0 {
            return Err(anyhow!("`max_file_bytes` must be greater than 0"));
        }
        if self.filters.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(anyhow!("at least one input file extension is required"));
        }
        if self.limits.snippet_context_lines > 50 {
            return Err(anyhow!(
                "`snippet_context_lines` too large: {}",
                self.limits.snippet_context_lines
            ));
        }
        Ok(())
    }
}

/// File filtering rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// File extensions treated as ORCA inputs (without the dot, case-insensitive).
    pub extensions: Vec<String>,
    /// Glob patterns for files to ignore.
    pub ignore_globs: Vec<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            extensions: vec!["inp".into(), "orca".into()],
            ignore_globs: vec![
                "**/.git/**".into(),
                "**/target/**".into(),
            ],
        }
    }
}

/// Limits for scanning and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum file size to parse (bytes).
    pub max_file_bytes: usize,
    /// Lines of context around a diagnostic snippet.
    pub snippet_context_lines: usize,
    /// Maximum diagnostics recorded per file (0 = unlimited).
    pub max_diagnostics_per_file: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 4 * 1024 * 1024, // 4 MB
            snippet_context_lines: 1,
            max_diagnostics_per_file: 0,
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Whether to keep the raw text of `{ ... }` body entries.
    pub keep_raw_content: bool,
    /// Whether quoted values that look like file names become `reads_file` edges.
    pub link_quoted_files: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keep_raw_content: true,
            link_quoted_files: true,
        }
    }
}
