//! `metadata.json` generation.
//!
//! The file records project info plus, for every mapped entity whose schema
//! and data file both exist, the path, SHA-256 checksum and size of each.
//! It is rewritten only when something other than `generated_at` changed.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::checksum::all_file_checksums;
use crate::config::{entity_name, Mappings, ProjectConfig, ProjectMeta};
use crate::errors::{PortoError, PortoResult};

pub const CHECKSUM_ALGORITHM: &str = "SHA-256";
pub const CHECKSUM_NOTE: &str = "Use checksums to verify data integrity and detect changes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub project: ProjectMeta,
    pub generated_at: String,
    pub entities: IndexMap<String, EntityFiles>,
    pub checksums: ChecksumInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityFiles {
    pub data: FileInfo,
    pub schema: FileInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub checksum: String,
    pub size: u64,
    /// Schema `$id`; only present on schema entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumInfo {
    pub algorithm: String,
    pub note: String,
}

impl Default for ChecksumInfo {
    fn default() -> Self {
        Self {
            algorithm: CHECKSUM_ALGORITHM.to_string(),
            note: CHECKSUM_NOTE.to_string(),
        }
    }
}

/// What `write_metadata_if_changed` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataWrite {
    Created,
    Updated,
    Unchanged,
}

impl MetadataWrite {
    pub fn wrote(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Current UTC time in RFC 3339.
pub fn now_rfc3339() -> PortoResult<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| PortoError::serialization(format!("failed to format timestamp: {e}")))
}

pub fn generate_metadata(
    cfg: &ProjectConfig,
    mappings: &Mappings,
    project: &ProjectMeta,
    generated_at: impl Into<String>,
) -> PortoResult<Metadata> {
    let checksums = all_file_checksums(&cfg.root, mappings)?;
    let mut entities = IndexMap::new();

    for (schema_rel, data_rel) in mappings.schema_data_pairs() {
        let schema_path = cfg.root.join(schema_rel);
        let data_path = cfg.root.join(data_rel);
        if !schema_path.is_file() || !data_path.is_file() {
            tracing::debug!("skipping {data_rel}: schema or data file missing");
            continue;
        }

        let file_info = |rel: &str, path: &Path| -> PortoResult<FileInfo> {
            let size = std::fs::metadata(path)
                .map_err(|e| PortoError::io(path, e))?
                .len();
            Ok(FileInfo {
                path: rel.to_string(),
                checksum: checksums.get(rel).cloned().unwrap_or_default(),
                size,
                url: None,
            })
        };

        let mut schema = file_info(schema_rel, &schema_path)?;
        schema.url = Some(schema_url(&schema_path));
        entities.insert(
            entity_name(data_rel),
            EntityFiles {
                data: file_info(data_rel, &data_path)?,
                schema,
            },
        );
    }

    Ok(Metadata {
        project: project.clone(),
        generated_at: generated_at.into(),
        entities,
        checksums: ChecksumInfo::default(),
    })
}

/// The schema's string `$id`, or empty.
fn schema_url(path: &Path) -> String {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .and_then(|v| v.get("$id").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default()
}

/// Pretty JSON with 4-space indentation and a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> PortoResult<String> {
    let mut buf = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    value
        .serialize(&mut ser)
        .map_err(|e| PortoError::serialization(e.to_string()))?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| PortoError::serialization(e.to_string()))
}

/// Write `metadata` unless the existing file matches it apart from `generated_at`.
pub fn write_metadata_if_changed(path: &Path, metadata: &Metadata) -> PortoResult<MetadataWrite> {
    let existing = std::fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok());

    let outcome = match existing {
        None => MetadataWrite::Created,
        Some(old) => {
            let new = serde_json::to_value(metadata)
                .map_err(|e| PortoError::serialization(e.to_string()))?;
            if without_timestamp(old) == without_timestamp(new) {
                return Ok(MetadataWrite::Unchanged);
            }
            MetadataWrite::Updated
        }
    };

    std::fs::write(path, to_pretty_json(metadata)?).map_err(|e| PortoError::io(path, e))?;
    tracing::info!(path = %path.display(), ?outcome, "metadata written");
    Ok(outcome)
}

fn without_timestamp(mut v: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.remove("generated_at");
    }
    v
}
