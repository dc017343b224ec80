//! `DataLinksValidator`: loads the documents once and runs every rule.
//!
//! Directory problems are raised from `new`. Missing or malformed documents
//! become a single error finding and no rule runs. Everything else the rules
//! notice is a finding; nothing in a run panics or returns an error.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::DataFiles;
use crate::errors::{PortoError, PortoResult};
use crate::findings::{Severity, ValidationResults};
use crate::index::LookupIndex;
use crate::loader::{load_documents, DocumentSet};
use crate::rules::{default_rules, Rule, RuleContext};

pub struct DataLinksValidator {
    data_dir: PathBuf,
    files: DataFiles,
    all_data_files: BTreeSet<String>,
    rules: Vec<Box<dyn Rule>>,
    docs: Option<DocumentSet>,
    results: ValidationResults,
}

impl DataLinksValidator {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        files: DataFiles,
        all_data_files: BTreeSet<String>,
    ) -> PortoResult<Self> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            return Err(PortoError::configuration(format!(
                "Data directory does not exist: {}",
                data_dir.display()
            )));
        }
        if !data_dir.is_dir() {
            return Err(PortoError::configuration(format!(
                "Path is not a directory: {}",
                data_dir.display()
            )));
        }
        Ok(Self {
            data_dir,
            files,
            all_data_files,
            rules: default_rules(),
            docs: None,
            results: ValidationResults::new(),
        })
    }

    /// Replace the rule set. Mostly useful for running a subset in tests.
    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the documents. A no-op once a load has succeeded.
    ///
    /// Returns `false` when a document is missing or malformed; the failure is
    /// recorded as an error finding.
    pub fn load(&mut self) -> bool {
        if self.docs.is_some() {
            return true;
        }
        match load_documents(&self.data_dir, &self.files) {
            Ok(docs) => {
                tracing::debug!("loaded documents from {}", self.data_dir.display());
                self.docs = Some(docs);
                true
            }
            Err(failure) => {
                tracing::warn!("document load failed: {failure}");
                self.results.error(failure.to_string());
                false
            }
        }
    }

    pub fn documents(&self) -> Option<&DocumentSet> {
        self.docs.as_ref()
    }

    /// Run every rule in order and return the collected findings.
    ///
    /// Each call starts from an empty collector, so repeated runs over an
    /// unchanged directory produce identical results.
    pub fn validate_all(&mut self) -> &ValidationResults {
        self.results.clear();
        if !self.load() {
            return &self.results;
        }
        let Some(docs) = self.docs.as_ref() else {
            return &self.results;
        };

        let index = LookupIndex::build(docs, &self.all_data_files);
        let ctx = RuleContext {
            docs,
            index: &index,
            files: &self.files,
        };
        for rule in &self.rules {
            tracing::debug!(rule = rule.id(), "running rule");
            rule.check(&ctx, &mut self.results);
        }

        tracing::info!(
            errors = self.results.count(Severity::Error),
            fixes_needed = self.results.count(Severity::FixNeeded),
            warnings = self.results.count(Severity::Warning),
            correct = self.results.count(Severity::Correct),
            "data links validation finished"
        );
        &self.results
    }

    pub fn results(&self) -> &ValidationResults {
        &self.results
    }

    pub fn into_results(self) -> ValidationResults {
        self.results
    }
}
