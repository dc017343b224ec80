//! `data_links.dependencies`: coverage of data files and the circular spot-check.

use std::collections::{BTreeMap, BTreeSet};

use crate::findings::{quoted_list, ValidationResults};
use crate::rules::{Rule, RuleContext};

pub struct DependenciesRule;

impl Rule for DependenciesRule {
    fn id(&self) -> &str {
        "dependencies.coverage"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let deps = &ctx.docs.data_links.dependencies;
        let known = ctx.index.all_data_files;

        let declared: BTreeSet<&str> = deps.values().filter_map(|d| d.file.as_deref()).collect();
        let missing: Vec<&str> = known
            .iter()
            .map(String::as_str)
            .filter(|f| *f != ctx.files.data_links && !declared.contains(f))
            .collect();
        if missing.is_empty() {
            results.correct("All data files are covered in dependencies section");
        } else {
            results.fix_needed(format!(
                "Data files not in dependencies section: {}",
                quoted_list(missing)
            ));
        }

        for (name, dep) in deps.iter() {
            match dep.file.as_deref() {
                Some(f) if known.contains(f) => {}
                other => results.warning(format!(
                    "Dependency file '{}' is not a known data file",
                    other.unwrap_or("null")
                )),
            }
            for target in &dep.depends_on {
                if !known.contains(target) {
                    results.warning(format!(
                        "Dependency '{target}' in '{name}' is not a known data file"
                    ));
                }
            }
        }
    }
}

/// Reports only the `products <-> prices` two-cycle. Other cycles in the
/// graph are not searched for.
pub struct CircularDependencyRule;

impl CircularDependencyRule {
    /// File stem -> stems it depends on. A later entry for the same file
    /// replaces an earlier one.
    pub fn graph(ctx: &RuleContext<'_>) -> BTreeMap<String, BTreeSet<String>> {
        ctx.docs
            .data_links
            .dependencies
            .values()
            .map(|dep| {
                let node = dep.file.as_deref().unwrap_or("").replace(".json", "");
                let edges: BTreeSet<String> =
                    dep.depends_on.iter().map(|d| d.replace(".json", "")).collect();
                (node, edges)
            })
            .collect()
    }
}

impl Rule for CircularDependencyRule {
    fn id(&self) -> &str {
        "dependencies.circular"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let graph = Self::graph(ctx);
        let depends = |from: &str, to: &str| graph.get(from).is_some_and(|e| e.contains(to));
        if depends("prices", "products") && depends("products", "prices") {
            results.warning(
                "Circular dependency detected: products depends on prices, and prices depends on products. This may be intentional but should be reviewed.",
            );
        }
    }
}
