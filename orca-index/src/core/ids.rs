//! Stable identifiers and content hashing utilities.
//!
//! - UUID v5 (namespace/name-based) for deterministic IDs, namespace `Uuid::nil()`;
//! - Simple FNV-1a 64-bit content hash.

use crate::model::graph::GraphNodeKind;
use uuid::Uuid;

/// Compute a deterministic UUID v5 from a logical key.
#[inline]
pub fn uuid_v5_from_key(key: &str) -> String {
    Uuid::new_v5(&Uuid::nil(), key.as_bytes()).to_string()
}

/// Stable graph/document ID: node kind + normalized root-relative path.
pub fn node_id(kind: GraphNodeKind, repo_rel_path: &str) -> String {
    let key = format!("orca|{}|{}", kind, repo_rel_path);
    uuid_v5_from_key(&key)
}

/// FNV-1a 64-bit content hash as a lowercase hex string.
pub fn hash_content(bytes: &[u8]) -> String {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{:016x}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deterministic_and_kind_scoped() {
        let a = node_id(GraphNodeKind::Document, "h2o/opt.inp");
        assert_eq!(a, node_id(GraphNodeKind::Document, "h2o/opt.inp"));
        assert_ne!(a, node_id(GraphNodeKind::External, "h2o/opt.inp"));
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 5);
    }

    #[test]
    fn fnv_reference_values() {
        assert_eq!(hash_content(b""), "cbf29ce484222325");
        assert_eq!(hash_content(b"a"), "af63dc4c8601ec8c");
    }
}
