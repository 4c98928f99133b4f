//! Configuration loader and validator.
//!
//! Responsibilities:
//! - Read `.orcaindex.yml` from the indexed root, if present
//! - Apply environment overrides on top
//! - Validate constraints (e.g., max_file_bytes must be > 0)
//!
//! # Environment
//! - `ORCA_INDEX_MAX_FILE_BYTES`: maximum input size in bytes.
//! - `ORCA_INDEX_EXTENSIONS`: comma-separated list of input extensions.

pub mod model;

use crate::config::model::IndexConfig;
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::{debug, info};

/// Name of the optional config file looked up in the indexed root.
pub const CONFIG_FILE_NAME: &str = ".orcaindex.yml";

/// Load [`IndexConfig`] for `root`: file, then ENV, then validation.
///
/// # Arguments
/// * `root` - canonical path to the directory being indexed.
pub fn load(root: &Path) -> Result<IndexConfig> {
    let path = root.join(CONFIG_FILE_NAME);
    let mut cfg = if path.is_file() {
        let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let cfg: IndexConfig =
            serde_yml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        info!("config: loaded {}", path.display());
        cfg
    } else {
        debug!("config: no {} in root, using defaults", CONFIG_FILE_NAME);
        IndexConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply `ORCA_INDEX_*` overrides read through `lookup`.
fn apply_env_overrides(
    cfg: &mut IndexConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(raw) = lookup("ORCA_INDEX_MAX_FILE_BYTES") {
        cfg.limits.max_file_bytes = raw
            .trim()
            .parse()
            .with_context(|| format!("ORCA_INDEX_MAX_FILE_BYTES is not a number: {raw:?}"))?;
    }
    if let Some(raw) = lookup("ORCA_INDEX_EXTENSIONS") {
        cfg.filters.extensions = raw
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(IndexConfig::default().validate().is_ok());
    }

    #[test]
    fn env_overrides_limits_and_extensions() {
        let mut cfg = IndexConfig::default();
        apply_env_overrides(
            &mut cfg,
            env(&[
                ("ORCA_INDEX_MAX_FILE_BYTES", " 1024 "),
                ("ORCA_INDEX_EXTENSIONS", ".INP, in,,"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.limits.max_file_bytes, 1024);
        assert_eq!(cfg.filters.extensions, vec!["inp", "in"]);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let mut cfg = IndexConfig::default();
        let err = apply_env_overrides(&mut cfg, env(&[("ORCA_INDEX_MAX_FILE_BYTES", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("ORCA_INDEX_MAX_FILE_BYTES"));
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let mut cfg = IndexConfig::default();
        cfg.limits.max_file_bytes = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = IndexConfig::default();
        cfg.filters.extensions = vec![" ".into()];
        assert!(cfg.validate().is_err());

        let mut cfg = IndexConfig::default();
        cfg.limits.snippet_context_lines = 51;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: IndexConfig = serde_yml::from_str("limits:\n  max_file_bytes: 10\n").unwrap();
        assert_eq!(cfg.limits.max_file_bytes, 10);
        assert_eq!(cfg.limits.snippet_context_lines, 1);
        assert_eq!(cfg.filters, model::Filters::default());
    }

    #[test]
    fn load_reads_the_root_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "filters:\n  extensions: [inp, in]\nextract:\n  link_quoted_files: false\n",
        )
        .unwrap();
        let cfg = load(dir.path()).unwrap();
        assert!(cfg.filters.extensions.contains(&"in".to_string()));
        assert!(!cfg.extract.link_quoted_files);
    }
}
