//! `global_settings.lookup_method` and `global_settings.price_source`.

use std::collections::BTreeSet;

use crate::constants::{EXPECTED_LOOKUP_ARRAY, MATCH_DESCRIPTION_KEY};
use crate::findings::{quoted_list, ValidationResults};
use crate::rules::{Rule, RuleContext};

pub struct LookupMethodRule;

impl Rule for LookupMethodRule {
    fn id(&self) -> &str {
        "global_settings.lookup_method"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let settings = &ctx.docs.data_links.global_settings;
        let lookup = &settings.lookup_method;

        check_file_reference(
            ctx,
            lookup.file.as_deref(),
            "lookup_method.file",
            &["global_settings", "lookup_method", "file"],
            results,
        );
        check_file_reference(
            ctx,
            settings.price_source.as_deref(),
            "price_source",
            &["global_settings", "price_source"],
            results,
        );
        check_array(ctx, lookup.array.as_deref().unwrap_or(""), results);
        check_match_keys(ctx, results);
    }
}

/// The field must name the prices file, and that file must be a known data file.
fn check_file_reference(
    ctx: &RuleContext<'_>,
    actual: Option<&str>,
    field: &str,
    path: &[&str],
    results: &mut ValidationResults,
) {
    let expected = ctx.files.prices.as_str();
    let actual = actual.unwrap_or("");
    if actual != expected {
        results.error(format!(
            "{field} '{actual}' should be '{expected}'. {}",
            ctx.found_in(path)
        ));
    } else if ctx.index.all_data_files.contains(expected) {
        results.correct(format!("{field} '{expected}' matches actual file"));
    } else {
        results.error(format!(
            "{field} references '{expected}' but file doesn't exist. {}",
            ctx.found_in(path)
        ));
    }
}

fn check_array(ctx: &RuleContext<'_>, array: &str, results: &mut ValidationResults) {
    let path = ctx.found_in(&["global_settings", "lookup_method", "array"]);
    if array != EXPECTED_LOOKUP_ARRAY {
        results.warning(format!(
            "Lookup method array path '{array}' - verify this matches actual structure. Expected: '{EXPECTED_LOOKUP_ARRAY}'. {path}"
        ));
    } else if ctx.docs.prices.has_product_prices_path() {
        results.correct(format!(
            "lookup_method.array '{EXPECTED_LOOKUP_ARRAY}' matches actual structure"
        ));
    } else {
        results.error(format!(
            "Lookup method references '{EXPECTED_LOOKUP_ARRAY}' but structure doesn't match. {path}"
        ));
    }
}

/// Match keys (except `description`) must be fields of the first product price.
fn check_match_keys(ctx: &RuleContext<'_>, results: &mut ValidationResults) {
    let Some(sample) = ctx.index.product_prices.first() else {
        results.warning("No product prices found to validate lookup_method.match keys");
        return;
    };

    let available = sample.field_names();
    let wanted: BTreeSet<&str> = ctx
        .docs
        .data_links
        .global_settings
        .lookup_method
        .match_keys
        .keys()
        .map(String::as_str)
        .filter(|k| *k != MATCH_DESCRIPTION_KEY)
        .collect();
    let missing: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|k| !available.contains(*k))
        .collect();

    if missing.is_empty() {
        results.correct(format!(
            "lookup_method.match keys {} exist in price entries",
            quoted_list(&wanted)
        ));
    } else {
        results.error(format!(
            "lookup_method.match keys {} do not exist in price entries. Available keys: {}. {}",
            quoted_list(missing),
            quoted_list(&available),
            ctx.found_in(&["global_settings", "lookup_method", "match"])
        ));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::findings::Severity;
    use crate::loader::DocumentSet;
    use crate::rules::testing::{doc, run_rule};

    fn docs(links: serde_json::Value, prices: serde_json::Value) -> DocumentSet {
        DocumentSet {
            data_links: doc(links),
            prices: doc(prices),
            ..DocumentSet::default()
        }
    }

    fn well_formed_links() -> serde_json::Value {
        json!({
            "global_settings": {
                "price_source": "prices.json",
                "lookup_method": {
                    "file": "prices.json",
                    "array": "prices.product_prices",
                    "match": { "product_id": "x", "zone": "y", "weight_tier": "z", "description": "d" }
                }
            }
        })
    }

    #[test]
    fn well_formed_lookup_is_all_correct() {
        let d = docs(
            well_formed_links(),
            json!({ "prices": { "product_prices": [
                { "product_id": "P1", "zone": "Z1", "weight_tier": "W1", "price": [] }
            ] } }),
        );
        let r = run_rule(&LookupMethodRule, &d);
        assert_eq!(r.count(Severity::Error), 0);
        assert_eq!(r.count(Severity::Warning), 0);
        assert_eq!(
            r.correct_items(),
            vec![
                "lookup_method.file 'prices.json' matches actual file",
                "price_source 'prices.json' matches actual file",
                "lookup_method.array 'prices.product_prices' matches actual structure",
                "lookup_method.match keys ['product_id', 'weight_tier', 'zone'] exist in price entries",
            ]
        );
    }

    #[test]
    fn null_valued_match_key_still_counts_as_present() {
        let d = docs(
            well_formed_links(),
            json!({ "prices": { "product_prices": [
                { "product_id": "P1", "zone": null, "weight_tier": "W1", "price": [] }
            ] } }),
        );
        let r = run_rule(&LookupMethodRule, &d);
        assert!(r.errors().is_empty(), "unexpected errors: {:?}", r.errors());
        assert!(r.correct_items().contains(
            &"lookup_method.match keys ['product_id', 'weight_tier', 'zone'] exist in price entries"
        ));
    }

    #[test]
    fn wrong_file_names_are_errors() {
        let mut links = well_formed_links();
        links["global_settings"]["lookup_method"]["file"] = json!("price.json");
        links["global_settings"]["price_source"] = json!(null);
        let d = docs(links, json!({ "prices": { "product_prices": [] } }));
        let r = run_rule(&LookupMethodRule, &d);
        assert_eq!(
            r.errors(),
            vec![
                "lookup_method.file 'price.json' should be 'prices.json'. Found in: data_links.json -> global_settings -> lookup_method -> file",
                "price_source '' should be 'prices.json'. Found in: data_links.json -> global_settings -> price_source",
            ]
        );
    }

    #[test]
    fn array_literal_mismatch_is_warning_and_missing_path_is_error() {
        let mut links = well_formed_links();
        links["global_settings"]["lookup_method"]["array"] = json!("prices.items");
        let r = run_rule(&LookupMethodRule, &docs(links, json!({ "prices": {} })));
        assert!(r.warnings().iter().any(|w| w.starts_with("Lookup method array path 'prices.items'")));

        let r = run_rule(&LookupMethodRule, &docs(well_formed_links(), json!({ "prices": {} })));
        assert!(r
            .errors()
            .iter()
            .any(|e| e.starts_with("Lookup method references 'prices.product_prices' but structure doesn't match")));
    }

    #[test]
    fn missing_match_key_lists_available_keys() {
        let mut links = well_formed_links();
        links["global_settings"]["lookup_method"]["match"] = json!({ "product_id": "a", "region": "b" });
        let d = docs(
            links,
            json!({ "prices": { "product_prices": [
                { "product_id": "P1", "zone": "Z1", "weight_tier": "W1" }
            ] } }),
        );
        let r = run_rule(&LookupMethodRule, &d);
        assert_eq!(
            r.errors(),
            vec!["lookup_method.match keys ['region'] do not exist in price entries. Available keys: ['product_id', 'weight_tier', 'zone']. Found in: data_links.json -> global_settings -> lookup_method -> match"]
        );
    }

    #[test]
    fn no_product_prices_warns() {
        let d = docs(well_formed_links(), json!({ "prices": { "product_prices": [] } }));
        let r = run_rule(&LookupMethodRule, &d);
        assert!(r
            .warnings()
            .contains(&"No product prices found to validate lookup_method.match keys"));
    }
}
