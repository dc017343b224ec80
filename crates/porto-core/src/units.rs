//! Unit consistency sub-checker shared by the four unit dimensions.

use crate::findings::ValidationResults;

/// One document's value for a unit dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitObservation<'a> {
    pub file: &'a str,
    pub value: Option<&'a str>,
}

impl<'a> UnitObservation<'a> {
    pub fn new(file: &'a str, value: Option<&'a str>) -> Self {
        Self { file, value }
    }
}

/// Compare every observed value for `dimension`.
///
/// All equal and canonical: correct. All equal but not canonical: warning.
/// Any divergence: one error listing every file's value. A missing value
/// counts as its own value (`null`).
pub fn check_unit_consistency(
    dimension: &str,
    expected: &str,
    observations: &[UnitObservation<'_>],
    results: &mut ValidationResults,
) {
    let Some(first) = observations.first() else {
        return;
    };

    if observations.iter().all(|o| o.value == first.value) {
        if first.value == Some(expected) {
            results.correct(format!(
                "Unit {dimension} '{expected}' is consistent across all files"
            ));
        } else {
            let files: Vec<&str> = observations.iter().map(|o| o.file).collect();
            results.warning(format!(
                "Unit {dimension} '{}' is consistent but verify it's correct. Expected: '{expected}'. Found in: {} -> unit -> {dimension}",
                display_value(first.value),
                files.join(", ")
            ));
        }
        return;
    }

    let values: Vec<String> = observations
        .iter()
        .map(|o| format!("{}={}", o.file, display_value(o.value)))
        .collect();
    results.error(format!(
        "{} unit mismatch: {}. Expected: '{expected}'",
        capitalize(dimension),
        values.join(", ")
    ));
}

fn display_value(v: Option<&str>) -> &str {
    v.unwrap_or("null")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
