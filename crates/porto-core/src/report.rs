//! Text rendering of validation findings.
//!
//! Two modes:
//! - `Validate`: terse CI output (errors, fixes, warnings; no confirmations)
//! - `Analyze`: every category under a header, plus a count summary
//!
//! Rendering is pure. Callers print `text` and exit with `exit_code`.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::config::DataFiles;
use crate::errors::PortoResult;
use crate::findings::{Severity, ValidationResults};
use crate::validator::DataLinksValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    Validate,
    Analyze,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    pub text: String,
    pub exit_code: i32,
}

pub fn render(results: &ValidationResults, mode: ReportMode) -> RenderedReport {
    match mode {
        ReportMode::Validate => render_validate(results),
        ReportMode::Analyze => render_analyze(results),
    }
}

/// 0 unless there is at least one error. Same rule for both modes.
pub fn exit_code(results: &ValidationResults) -> i32 {
    if results.has_errors() {
        1
    } else {
        0
    }
}

fn render_validate(results: &ValidationResults) -> RenderedReport {
    let mut out = String::from("Validating data_links.json against data files...\n\n");

    let sections = [
        (Severity::Error, "❌ ERROR: "),
        (Severity::FixNeeded, "🔧 FIX NEEDED: "),
        (Severity::Warning, "⚠️  WARNING: "),
    ];
    for (severity, prefix) in sections {
        let messages = results.messages(severity);
        if messages.is_empty() {
            continue;
        }
        for m in messages {
            let _ = writeln!(out, "{prefix}{m}");
        }
        out.push('\n');
    }

    if results.has_errors() {
        out.push_str("❌ ERROR: Validation failed. Please fix the errors above.\n");
    } else {
        out.push_str("✅ All validations passed! data_links.json is consistent with data files.\n");
    }

    RenderedReport {
        text: out,
        exit_code: exit_code(results),
    }
}

fn render_analyze(results: &ValidationResults) -> RenderedReport {
    let rule = "=".repeat(70);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    out.push_str("COMPREHENSIVE DATA_LINKS.JSON ANALYSIS\n");
    let _ = writeln!(out, "{rule}");
    out.push('\n');

    let sections = [
        (Severity::Correct, "✅ CORRECT:", "✅"),
        (Severity::FixNeeded, "🔧 FIXES NEEDED:", "🔧"),
        (Severity::Warning, "⚠️  WARNINGS:", "⚠️ "),
        (Severity::Error, "❌ ERRORS:", "❌"),
    ];
    for (severity, header, marker) in sections {
        let messages = results.messages(severity);
        if messages.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{header}");
        for m in messages {
            let _ = writeln!(out, "   {marker} {m}");
        }
        out.push('\n');
    }

    let errors = results.count(Severity::Error);
    let fixes = results.count(Severity::FixNeeded);
    let warnings = results.count(Severity::Warning);
    if errors + fixes + warnings == 0 {
        out.push_str("🎉 All checks passed! data_links.json is correct.\n");
    } else {
        let _ = writeln!(
            out,
            "📊 Summary: {errors} errors, {fixes} fixes needed, {warnings} warnings"
        );
    }

    RenderedReport {
        text: out,
        exit_code: exit_code(results),
    }
}

/// Validate one data directory and render the findings.
pub fn validate_data_links(
    data_dir: &Path,
    files: &DataFiles,
    all_data_files: BTreeSet<String>,
    mode: ReportMode,
) -> PortoResult<(ValidationResults, RenderedReport)> {
    let mut validator = DataLinksValidator::new(data_dir, files.clone(), all_data_files)?;
    validator.validate_all();
    let results = validator.into_results();
    let report = render(&results, mode);
    Ok((results, report))
}
