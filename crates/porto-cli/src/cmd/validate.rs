use anyhow::Result;
use porto_core::config::Project;
use porto_core::report::{validate_data_links, ReportMode};
use porto_core::schema::{validate_all_schemas, Draft7Validator};
use serde_json::json;

use crate::args::ValidateKind;
use crate::output::Outcome;

pub fn run(project: &Project, kind: Option<ValidateKind>, analyze: bool) -> Result<Outcome> {
    let mode = if analyze {
        ReportMode::Analyze
    } else {
        ReportMode::Validate
    };
    match kind {
        Some(ValidateKind::Schema) => Ok(schemas(project)),
        Some(ValidateKind::Links) => links(project, mode),
        None => all(project),
    }
}

/// Schema validation first; links only run when every file matches its schema.
fn all(project: &Project) -> Result<Outcome> {
    let schema = schemas(project);
    if schema.exit_code != 0 {
        return Ok(Outcome::new(
            schema.text,
            json!({ "schema": schema.json, "exit_code": schema.exit_code }),
            schema.exit_code,
        ));
    }
    let links = links(project, ReportMode::Validate)?;
    Ok(Outcome::new(
        format!("{}\n{}", schema.text, links.text),
        json!({
            "schema": schema.json,
            "links": links.json,
            "exit_code": links.exit_code,
        }),
        links.exit_code,
    ))
}

pub fn schemas(project: &Project) -> Outcome {
    let report = validate_all_schemas(&project.config.root, &project.mappings, &Draft7Validator);
    let code = report.exit_code();
    tracing::info!(
        files = report.files.len(),
        failed = report.failed().count(),
        "schema validation finished"
    );
    Outcome::new(
        report.render(),
        json!({ "files": report.files, "exit_code": code }),
        code,
    )
}

fn links(project: &Project, mode: ReportMode) -> Result<Outcome> {
    let files = project.data_files()?;
    let (results, report) = validate_data_links(
        &project.config.data_dir,
        &files,
        project.mappings.data_file_names(),
        mode,
    )?;
    let mut value = serde_json::to_value(&results)?;
    value["exit_code"] = json!(report.exit_code);
    Ok(Outcome::new(report.text, value, report.exit_code))
}
