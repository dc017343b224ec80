//! `porto hook pre-commit`: schema check plus metadata.json staging guard.
//!
//! When data or schema files are staged, a regenerated `metadata.json` has
//! to be staged in the same commit. Anything else passes.

use std::collections::BTreeSet;
use std::path::Path;

use porto_core::checksum::has_file_changes;
use porto_core::config::{Project, METADATA_FILE};
use serde::Serialize;
use serde_json::json;

use crate::cmd::{metadata, validate};
use crate::git::{any_paths, GitQueries};
use crate::output::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStatus {
    SchemaFailed,
    GeneratedNotStaged,
    ModifiedNotStaged,
    GeneratedAndStaged,
    GeneratedUnstaged,
    UpToDate,
    GenerationFailed,
    NoChanges,
}

impl HookStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SchemaFailed | Self::GeneratedNotStaged | Self::ModifiedNotStaged => 1,
            _ => 0,
        }
    }
}

pub fn pre_commit(project: &Project, git: &dyn GitQueries) -> Outcome {
    let schema = validate::schemas(project);
    let mut out = schema.text;

    let status = if schema.exit_code != 0 {
        HookStatus::SchemaFailed
    } else {
        sync_metadata(project, git, &mut out)
    };
    tracing::info!(?status, "pre-commit hook finished");

    let code = status.exit_code();
    Outcome::new(
        out,
        json!({ "status": status, "schema": schema.json, "exit_code": code }),
        code,
    )
}

fn sync_metadata(project: &Project, git: &dyn GitQueries, out: &mut String) -> HookStatus {
    let watched = watched_dirs(project);
    let watched: Vec<&str> = watched.iter().map(String::as_str).collect();
    let data_staged = any_paths(git.staged_paths(&watched), "staged data/schema files");

    let changed = has_file_changes(
        &project.config.root,
        &project.mappings,
        &project.config.metadata_path,
    );
    let changed = match changed {
        Ok(c) => c,
        Err(e) => {
            out.push_str(&format!(
                "⚠ Warning: Could not generate metadata.json: {e}\n"
            ));
            return HookStatus::GenerationFailed;
        }
    };

    if !changed {
        if data_staged {
            let (modified, staged) = metadata_state(git);
            if modified && !staged {
                out.push_str(&not_staged_error(
                    "metadata.json is modified but not staged!",
                    "Data/schema files are staged, but metadata.json is modified and not staged.",
                ));
                return HookStatus::ModifiedNotStaged;
            }
        }
        out.push_str("\n✓ No changes detected, skipping metadata generation\n");
        return HookStatus::NoChanges;
    }

    out.push_str("\nChanges detected, generating metadata.json...\n");
    if let Err(e) = metadata::regenerate(project) {
        out.push_str(&format!(
            "⚠ Warning: Could not generate metadata.json: {e:#}\n"
        ));
        return HookStatus::GenerationFailed;
    }

    let (modified, staged) = metadata_state(git);
    if data_staged && modified && !staged {
        out.push_str(&not_staged_error(
            "metadata.json was generated but is not staged!",
            "data/schema files are staged, but metadata.json is not.",
        ));
        HookStatus::GeneratedNotStaged
    } else if modified && staged {
        out.push_str("✓ metadata.json generated and staged\n");
        HookStatus::GeneratedAndStaged
    } else if modified {
        out.push_str("✓ metadata.json generated (not needed for this commit)\n");
        HookStatus::GeneratedUnstaged
    } else {
        out.push_str("✓ metadata.json up to date\n");
        HookStatus::UpToDate
    }
}

/// `(modified in the working tree, staged)` for metadata.json.
fn metadata_state(git: &dyn GitQueries) -> (bool, bool) {
    let modified = any_paths(git.modified_paths(&[METADATA_FILE]), METADATA_FILE);
    let staged = any_paths(git.staged_paths(&[METADATA_FILE]), METADATA_FILE);
    (modified, staged)
}

fn not_staged_error(headline: &str, detail: &str) -> String {
    format!(
        "\n❌ ERROR: {headline}\n\n{detail}\nPlease stage metadata.json in the same commit:\n  git add metadata.json\n  git commit\n\n"
    )
}

/// Directories holding mapped files, as git pathspecs (`data/`, `schemas/`).
fn watched_dirs(project: &Project) -> BTreeSet<String> {
    project
        .mappings
        .schema_data_pairs()
        .flat_map(|(schema, data)| [schema, data])
        .map(|rel| match Path::new(rel).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => format!("{}/", dir.display()),
            _ => rel.to_string(),
        })
        .collect()
}
