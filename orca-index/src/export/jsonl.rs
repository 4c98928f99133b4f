//! JSONL writers for pipeline artifacts.
//!
//! Each writer outputs **one compact JSON object per line**, making the format
//! grep-friendly and easy to stream.

use crate::model::{diagnostic::Diagnostic, document::InputDocument};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// Write any serializable records, one per line.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);

    for r in records {
        serde_json::to_writer(&mut w, r)?;
        w.write_all(b"\n")?;
    }

    w.flush()?;
    Ok(())
}

/// Write [`InputDocument`]s as JSON Lines (`documents.jsonl`).
pub fn write_documents_jsonl(path: &Path, documents: &[InputDocument]) -> Result<()> {
    write_jsonl(path, documents)?;
    info!("jsonl: wrote {} documents -> {}", documents.len(), path.display());
    Ok(())
}

/// Write [`Diagnostic`]s as JSON Lines (`diagnostics.jsonl`).
pub fn write_diagnostics_jsonl(path: &Path, diagnostics: &[Diagnostic]) -> Result<()> {
    write_jsonl(path, diagnostics)?;
    info!(
        "jsonl: wrote {} diagnostics -> {}",
        diagnostics.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("x.jsonl");
        write_jsonl(&p, &[serde_json::json!({"a": 1}), serde_json::json!({"b": [2, 3]})]).unwrap();
        let text = std::fs::read_to_string(&p).unwrap();
        let rows: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["b"][1], 3);
        assert!(text.ends_with('\n'));
    }
}
