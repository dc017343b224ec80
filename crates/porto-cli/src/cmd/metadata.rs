use std::fmt::Write as _;

use anyhow::Result;
use porto_core::config::{Project, ProjectMeta};
use porto_core::metadata::{
    generate_metadata, now_rfc3339, write_metadata_if_changed, Metadata, MetadataWrite,
};
use serde_json::json;

use crate::output::Outcome;

/// Build metadata for `project` and write it if the content changed.
pub fn regenerate(project: &Project) -> Result<(Metadata, MetadataWrite)> {
    let cfg = &project.config;
    let meta = ProjectMeta::load(&cfg.manifest_path)?;
    let metadata = generate_metadata(cfg, &project.mappings, &meta, now_rfc3339()?)?;
    let write = write_metadata_if_changed(&cfg.metadata_path, &metadata)?;
    Ok((metadata, write))
}

pub fn run(project: &Project) -> Outcome {
    let path = &project.config.metadata_path;
    let mut out = String::from("Generating metadata...\n");
    let _ = writeln!(out, "Project root: {}", project.config.root.display());

    let (metadata, write) = match regenerate(project) {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(error = %e, "metadata generation failed");
            let msg = format!("❌ ERROR: Failed to generate metadata.json: {e:#}");
            return Outcome::new(
                format!("{msg}\n"),
                json!({ "error": e.to_string(), "exit_code": 1 }),
                1,
            );
        }
    };

    match write {
        MetadataWrite::Created => out.push_str("✓ No existing metadata found, generating new\n"),
        MetadataWrite::Updated => out.push_str("✓ Changes detected, updating metadata\n"),
        MetadataWrite::Unchanged => {}
    }

    if write.wrote() {
        let _ = writeln!(out, "\n✓ Generated: {}", path.display());
        let _ = writeln!(
            out,
            "  - Project: {} v{}",
            metadata.project.name, metadata.project.version
        );
        let _ = writeln!(out, "  - Entities: {} entities", metadata.entities.len());
        let _ = writeln!(out, "  - Generated at: {}", metadata.generated_at);
        out.push_str("  - Status: Updated (changes detected)\n");
    } else {
        out.push_str("✓ No changes detected, keeping existing metadata\n");
    }

    let status = match write {
        MetadataWrite::Created => "created",
        MetadataWrite::Updated => "updated",
        MetadataWrite::Unchanged => "unchanged",
    };
    Outcome::new(
        out,
        json!({
            "status": status,
            "path": path.display().to_string(),
            "entities": metadata.entities.len(),
            "generated_at": metadata.generated_at,
            "exit_code": 0,
        }),
        0,
    )
}
