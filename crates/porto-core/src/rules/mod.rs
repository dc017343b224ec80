//! Cross-document consistency rules.
//!
//! Each rule reads the loaded documents and lookup index and appends findings.
//! Rules never fail and never read each other's findings; the order returned
//! by [`default_rules`] only fixes the order of output.
//!
//! Rule ids use dot-delimited namespaces:
//! - `global_settings.lookup_method`
//! - `links.products`, `links.completeness`, `links.references`
//! - `services.available`
//! - `dependencies.coverage`, `dependencies.circular`
//! - `units.consistency`

use crate::config::DataFiles;
use crate::findings::ValidationResults;
use crate::index::LookupIndex;
use crate::loader::DocumentSet;

pub mod dependencies;
pub mod links;
pub mod lookup;
pub mod services;
pub mod units;

pub use dependencies::{CircularDependencyRule, DependenciesRule};
pub use links::{LinkCompletenessRule, LinkReferencesRule, ProductLinksRule};
pub use lookup::LookupMethodRule;
pub use services::AvailableServicesRule;
pub use units::UnitsRule;

/// Everything a rule may read during one run.
pub struct RuleContext<'a> {
    pub docs: &'a DocumentSet,
    pub index: &'a LookupIndex<'a>,
    pub files: &'a DataFiles,
}

impl<'a> RuleContext<'a> {
    /// `Found in: data_links.json -> a -> b`
    pub fn found_in(&self, parts: &[&str]) -> String {
        let mut out = format!("Found in: {}", self.files.data_links);
        for p in parts {
            out.push_str(" -> ");
            out.push_str(p);
        }
        out
    }
}

/// A single consistency check.
pub trait Rule {
    fn id(&self) -> &str;

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults);
}

/// The eight rules, in output order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(LookupMethodRule),
        Box::new(ProductLinksRule),
        Box::new(LinkCompletenessRule),
        Box::new(LinkReferencesRule),
        Box::new(AvailableServicesRule),
        Box::new(DependenciesRule),
        Box::new(UnitsRule),
        Box::new(CircularDependencyRule),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeSet;

    use serde_json::Value;

    use super::*;

    /// Run one rule over documents built from JSON values.
    pub fn run_rule(rule: &dyn Rule, docs: &DocumentSet) -> ValidationResults {
        let files = DataFiles::conventional();
        let all: BTreeSet<String> = crate::model::DocumentKind::ALL
            .iter()
            .map(|k| files.file_for(*k).to_string())
            .collect();
        let index = LookupIndex::build(docs, &all);
        let ctx = RuleContext {
            docs,
            index: &index,
            files: &files,
        };
        let mut results = ValidationResults::new();
        rule.check(&ctx, &mut results);
        results
    }

    pub fn doc<T: serde::de::DeserializeOwned>(v: Value) -> T {
        serde_json::from_value(v).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_ordered_and_unique() {
        let ids: Vec<String> = default_rules().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids[0], "global_settings.lookup_method");
        assert_eq!(ids[7], "dependencies.circular");
        let unique: std::collections::BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
