//! Categorized validation findings.
//!
//! A run appends findings to one `ValidationResults`. Order of insertion is
//! preserved globally; per-severity views keep that order within a category.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Fails the run.
    Error,
    /// Drift between two sources of truth; does not fail the run.
    FixNeeded,
    Warning,
    /// Positive confirmation, only shown in analyze mode.
    Correct,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "errors",
            Self::FixNeeded => "fixes_needed",
            Self::Warning => "warnings",
            Self::Correct => "correct",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

/// Append-only collector for one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResults {
    findings: Vec<Finding>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.findings.push(Finding {
            severity,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn fix_needed(&mut self, message: impl Into<String>) {
        self.push(Severity::FixNeeded, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn correct(&mut self, message: impl Into<String>) {
        self.push(Severity::Correct, message);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Messages of one severity, in insertion order.
    pub fn messages(&self, severity: Severity) -> Vec<&str> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .map(|f| f.message.as_str())
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.messages(Severity::Error)
    }

    pub fn fixes_needed(&self) -> Vec<&str> {
        self.messages(Severity::FixNeeded)
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.messages(Severity::Warning)
    }

    pub fn correct_items(&self) -> Vec<&str> {
        self.messages(Severity::Correct)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn clear(&mut self) {
        self.findings.clear();
    }
}

impl Serialize for ValidationResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationResults", 4)?;
        s.serialize_field("errors", &self.errors())?;
        s.serialize_field("fixes_needed", &self.fixes_needed())?;
        s.serialize_field("warnings", &self.warnings())?;
        s.serialize_field("correct", &self.correct_items())?;
        s.end()
    }
}

/// Render names as `['a', 'b']`, the list format used in finding messages.
pub fn quoted_list<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let inner: Vec<String> = items
        .into_iter()
        .map(|s| format!("'{}'", s.as_ref()))
        .collect();
    format!("[{}]", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_keep_insertion_order() {
        let mut r = ValidationResults::new();
        r.error("e1");
        r.correct("c1");
        r.error("e2");
        r.warning("w1");
        assert_eq!(r.errors(), vec!["e1", "e2"]);
        assert_eq!(r.correct_items(), vec!["c1"]);
        assert_eq!(r.count(Severity::FixNeeded), 0);
        assert!(r.has_errors());
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn serializes_as_four_lists() {
        let mut r = ValidationResults::new();
        r.fix_needed("f");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "errors": [], "fixes_needed": ["f"], "warnings": [], "correct": [] })
        );
    }

    #[test]
    fn quoted_list_format() {
        assert_eq!(quoted_list(["Z1", "Z2"]), "['Z1', 'Z2']");
        assert_eq!(quoted_list(Vec::<String>::new()), "[]");
    }
}
