//! SHA-256 checksums for mapped schema and data files.
//!
//! Checksums are keyed by root-relative path exactly as written in
//! `mappings.json` (`schemas/...`, `data/...`), which is also how
//! `metadata.json` records them.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::Mappings;
use crate::errors::{PortoError, PortoResult};

/// Hash raw bytes and return lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

pub fn sha256_file_hex(path: impl AsRef<Path>) -> PortoResult<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| PortoError::io(path, e))?;
    Ok(sha256_hex(&bytes))
}

/// Checksums of every mapped schema and data file that exists under `root`.
pub fn all_file_checksums(
    root: &Path,
    mappings: &Mappings,
) -> PortoResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for (schema, data) in mappings.schema_data_pairs() {
        for rel in [schema, data] {
            let path = root.join(rel);
            if path.is_file() {
                out.insert(rel.to_string(), sha256_file_hex(&path)?);
            }
        }
    }
    Ok(out)
}

/// Checksums recorded in an existing `metadata.json`.
///
/// Reads the `entities.<name>.{data,schema}` layout, or the older
/// `schemas.files[]` / `data.files[]` layout when `entities` is absent.
/// A missing or unreadable file yields an empty map.
pub fn existing_checksums(metadata_path: &Path) -> BTreeMap<String, String> {
    let Ok(text) = std::fs::read_to_string(metadata_path) else {
        return BTreeMap::new();
    };
    let Ok(meta) = serde_json::from_str::<Value>(&text) else {
        tracing::debug!("ignoring malformed {}", metadata_path.display());
        return BTreeMap::new();
    };

    let mut out = BTreeMap::new();
    if let Some(entities) = meta.get("entities").and_then(Value::as_object) {
        for entity in entities.values() {
            for part in ["data", "schema"] {
                let Some(info) = entity.get(part) else {
                    continue;
                };
                if let Some(path) = info.get("path").and_then(Value::as_str) {
                    let sum = info.get("checksum").and_then(Value::as_str).unwrap_or("");
                    out.insert(path.to_string(), sum.to_string());
                }
            }
        }
        return out;
    }

    for section in ["schemas", "data"] {
        let files = meta
            .get(section)
            .and_then(|s| s.get("files"))
            .and_then(Value::as_array);
        for info in files.into_iter().flatten() {
            let path = info.get("path").and_then(Value::as_str);
            let sum = info.get("checksum").and_then(Value::as_str);
            if let (Some(path), Some(sum)) = (path, sum) {
                out.insert(path.to_string(), sum.to_string());
            }
        }
    }
    out
}

/// True when the current checksums differ from the recorded ones.
pub fn has_file_changes(
    root: &Path,
    mappings: &Mappings,
    metadata_path: &Path,
) -> PortoResult<bool> {
    let current = all_file_checksums(root, mappings)?;
    let recorded = existing_checksums(metadata_path);
    Ok(current != recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn project() -> (tempfile::TempDir, Mappings) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("schemas")).unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("schemas/zones.schema.json"), "{}").unwrap();
        std::fs::write(dir.path().join("data/zones.json"), "abc").unwrap();
        let m = Mappings::from_pairs([
            ("schemas/zones.schema.json", "data/zones.json"),
            ("schemas/gone.schema.json", "data/gone.json"),
        ]);
        (dir, m)
    }

    #[test]
    fn known_digest() {
        assert_eq!(sha256_hex(b"abc"), ABC);
    }

    #[test]
    fn checksums_skip_missing_files() {
        let (dir, m) = project();
        let sums = all_file_checksums(dir.path(), &m).unwrap();
        assert_eq!(sums.len(), 2);
        assert_eq!(sums["data/zones.json"], ABC);
    }

    #[test]
    fn reads_entity_and_legacy_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(
            &path,
            json!({ "entities": { "zones": {
                "data": { "path": "data/zones.json", "checksum": "aa" },
                "schema": { "path": "schemas/zones.schema.json" }
            } } })
            .to_string(),
        )
        .unwrap();
        let sums = existing_checksums(&path);
        assert_eq!(sums["data/zones.json"], "aa");
        assert_eq!(sums["schemas/zones.schema.json"], "");

        std::fs::write(
            &path,
            json!({
                "schemas": { "files": [{ "path": "schemas/a.schema.json", "checksum": "s" }] },
                "data": { "files": [{ "path": "data/a.json", "checksum": "d" }] }
            })
            .to_string(),
        )
        .unwrap();
        let sums = existing_checksums(&path);
        assert_eq!(sums.len(), 2);
        assert_eq!(sums["data/a.json"], "d");
    }

    #[test]
    fn missing_or_malformed_metadata_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        assert!(existing_checksums(&path).is_empty());
        std::fs::write(&path, "{oops").unwrap();
        assert!(existing_checksums(&path).is_empty());
    }

    #[test]
    fn detects_changes() {
        let (dir, m) = project();
        let meta = dir.path().join("metadata.json");
        assert!(has_file_changes(dir.path(), &m, &meta).unwrap());

        let legacy = json!({
            "schemas": { "files": [{ "path": "schemas/zones.schema.json", "checksum": sha256_hex(b"{}") }] },
            "data": { "files": [{ "path": "data/zones.json", "checksum": ABC }] }
        });
        std::fs::write(&meta, legacy.to_string()).unwrap();
        assert!(!has_file_changes(dir.path(), &m, &meta).unwrap());

        std::fs::write(dir.path().join("data/zones.json"), "abcd").unwrap();
        assert!(has_file_changes(dir.path(), &m, &meta).unwrap());
    }
}
