//! `data_links.links`: per-product applicability, completeness and references.

use std::collections::BTreeSet;

use crate::findings::{quoted_list, ValidationResults};
use crate::model::{LinkEntry, Product};
use crate::rules::{Rule, RuleContext};

/// Checks every link entry against its product, the zone and tier catalogues,
/// and the product prices.
pub struct ProductLinksRule;

impl Rule for ProductLinksRule {
    fn id(&self) -> &str {
        "links.products"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        for (product_id, link) in ctx.docs.data_links.links.iter() {
            let product_id = product_id.as_str();
            let Some(product) = ctx.index.product_dict.get(product_id) else {
                results.error(format!(
                    "Product '{product_id}' in links does not exist in {}. {}",
                    ctx.files.products,
                    ctx.found_in(&["links", product_id])
                ));
                continue;
            };
            check_zones(ctx, product_id, link, product, results);
            check_weight_tiers(ctx, product_id, link, product, results);
            check_price_coverage(ctx, product_id, link, results);
        }
    }
}

fn check_zones(
    ctx: &RuleContext<'_>,
    product_id: &str,
    link: &LinkEntry,
    product: &Product,
    results: &mut ValidationResults,
) {
    let link_zones = link.zone_set();
    for zone in &link_zones {
        if !ctx.index.zone_ids.contains_key(zone) {
            results.error(format!(
                "Zone '{zone}' for product '{product_id}' does not exist in {}. {}",
                ctx.files.zones,
                ctx.found_in(&["links", product_id, "zones"])
            ));
        }
    }

    let product_zones = product.zone_set();
    if link_zones == product_zones {
        results.correct(format!(
            "Product '{product_id}': zones match ({})",
            quoted_list(&link_zones)
        ));
    } else {
        results.fix_needed(format!(
            "Product '{product_id}': zones mismatch - links: {}, product: {}",
            quoted_list(&link_zones),
            quoted_list(&product_zones)
        ));
    }
}

fn check_weight_tiers(
    ctx: &RuleContext<'_>,
    product_id: &str,
    link: &LinkEntry,
    product: &Product,
    results: &mut ValidationResults,
) {
    let link_tiers = link.weight_tier_set();
    for tier in &link_tiers {
        if !ctx.index.weight_tier_ids.contains(tier) {
            results.error(format!(
                "Weight tier '{tier}' for product '{product_id}' does not exist in {}. {}",
                ctx.files.weight_tiers,
                ctx.found_in(&["links", product_id, "weight_tiers"])
            ));
        }
    }

    if let Some(own) = product.own_weight_tier() {
        if link_tiers.contains(own) {
            results.correct(format!(
                "Product '{product_id}': weight_tier '{own}' is in links"
            ));
        } else {
            results.fix_needed(format!(
                "Product '{product_id}': weight_tier '{own}' from product not in links {}",
                quoted_list(&link_tiers)
            ));
        }
    }

    let price_tiers = ctx.index.price_weight_tiers(product_id);
    let unlinked: Vec<&str> = price_tiers.difference(&link_tiers).copied().collect();
    if !unlinked.is_empty() {
        results.fix_needed(format!(
            "Product '{product_id}': prices exist for weight_tiers {} but not in links",
            quoted_list(unlinked)
        ));
    } else if price_tiers == link_tiers {
        results.correct(format!(
            "Product '{product_id}': all price weight_tiers match links ({})",
            quoted_list(&price_tiers)
        ));
    }
}

/// Every declared (zone, weight tier) pair should have a product price.
fn check_price_coverage(
    ctx: &RuleContext<'_>,
    product_id: &str,
    link: &LinkEntry,
    results: &mut ValidationResults,
) {
    let tiers = link.weight_tier_set();
    for zone in link.zone_set() {
        for tier in &tiers {
            if !ctx.index.has_price(product_id, zone, tier) {
                results.warning(format!(
                    "No price found for product '{product_id}', zone '{zone}', weight_tier '{tier}'"
                ));
            }
        }
    }
}

/// Every product must have a link entry. One finding for all missing ids.
pub struct LinkCompletenessRule;

impl Rule for LinkCompletenessRule {
    fn id(&self) -> &str {
        "links.completeness"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let links = &ctx.docs.data_links.links;
        let missing: Vec<&str> = ctx
            .index
            .product_dict
            .keys()
            .copied()
            .filter(|id| !links.contains_key(*id))
            .collect();
        if missing.is_empty() {
            results.correct("All products are in links");
        } else {
            results.fix_needed(format!(
                "Products in {} but not in links: {}",
                ctx.files.products,
                quoted_list(missing)
            ));
        }
    }
}

/// Summary confirmation that every zone and tier named in links is known.
/// Unknown ids are already errors per product, so nothing else is reported.
pub struct LinkReferencesRule;

impl Rule for LinkReferencesRule {
    fn id(&self) -> &str {
        "links.references"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let links = &ctx.docs.data_links.links;
        let zones: BTreeSet<&str> = links.values().flat_map(|l| l.zone_set()).collect();
        let tiers: BTreeSet<&str> = links.values().flat_map(|l| l.weight_tier_set()).collect();

        if zones.iter().all(|z| ctx.index.zone_ids.contains_key(z)) {
            results.correct("All zones in links are valid");
        }
        if tiers.iter().all(|t| ctx.index.weight_tier_ids.contains(t)) {
            results.correct("All weight_tiers in links are valid");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::findings::Severity;
    use crate::loader::DocumentSet;
    use crate::rules::testing::{doc, run_rule};

    fn docs(links: Value, products: Value, prices: Value) -> DocumentSet {
        DocumentSet {
            data_links: doc(json!({ "links": links })),
            products: doc(json!({ "products": products })),
            zones: doc(json!({ "zones": [{ "id": "Z1" }, { "id": "Z2" }] })),
            weight_tiers: doc(json!({ "weight_tiers": { "W1": {}, "W2": {} } })),
            prices: doc(json!({ "prices": { "product_prices": prices } })),
            ..DocumentSet::default()
        }
    }

    #[test]
    fn consistent_product_is_all_correct() {
        let d = docs(
            json!({ "P1": { "zones": ["Z1"], "weight_tiers": ["W1"] } }),
            json!([{ "id": "P1", "supported_zones": ["Z1"], "weight_tier": "W1" }]),
            json!([{ "product_id": "P1", "zone": "Z1", "weight_tier": "W1" }]),
        );
        let r = run_rule(&ProductLinksRule, &d);
        assert_eq!(
            r.correct_items(),
            vec![
                "Product 'P1': zones match (['Z1'])",
                "Product 'P1': weight_tier 'W1' is in links",
                "Product 'P1': all price weight_tiers match links (['W1'])",
            ]
        );
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn unknown_product_skips_other_checks() {
        let d = docs(
            json!({ "PX": { "zones": ["Z9"], "weight_tiers": ["W9"] } }),
            json!([]),
            json!([]),
        );
        let r = run_rule(&ProductLinksRule, &d);
        assert_eq!(
            r.errors(),
            vec!["Product 'PX' in links does not exist in products.json. Found in: data_links.json -> links -> PX"]
        );
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn unknown_zone_and_tier_are_errors() {
        let d = docs(
            json!({ "P1": { "zones": ["Z1", "Z9"], "weight_tiers": ["W9"] } }),
            json!([{ "id": "P1", "supported_zones": ["Z1", "Z9"] }]),
            json!([]),
        );
        let r = run_rule(&ProductLinksRule, &d);
        assert_eq!(
            r.errors(),
            vec![
                "Zone 'Z9' for product 'P1' does not exist in zones.json. Found in: data_links.json -> links -> P1 -> zones",
                "Weight tier 'W9' for product 'P1' does not exist in weight_tiers.json. Found in: data_links.json -> links -> P1 -> weight_tiers",
            ]
        );
    }

    #[test]
    fn drift_is_fix_needed() {
        let d = docs(
            json!({ "P1": { "zones": [], "weight_tiers": ["W2"] } }),
            json!([{ "id": "P1", "supported_zones": ["Z1"], "weight_tier": "W1" }]),
            json!([{ "product_id": "P1", "zone": "Z1", "weight_tier": "W1" }]),
        );
        let r = run_rule(&ProductLinksRule, &d);
        assert_eq!(
            r.fixes_needed(),
            vec![
                "Product 'P1': zones mismatch - links: [], product: ['Z1']",
                "Product 'P1': weight_tier 'W1' from product not in links ['W2']",
                "Product 'P1': prices exist for weight_tiers ['W1'] but not in links",
            ]
        );
    }

    #[test]
    fn missing_combinations_warn_in_sorted_order() {
        let d = docs(
            json!({ "P1": { "zones": ["Z2", "Z1"], "weight_tiers": ["W1"] } }),
            json!([{ "id": "P1", "supported_zones": ["Z1", "Z2"] }]),
            json!([{ "product_id": "P1", "zone": "Z1", "weight_tier": "W1" }]),
        );
        let r = run_rule(&ProductLinksRule, &d);
        assert_eq!(
            r.warnings(),
            vec!["No price found for product 'P1', zone 'Z2', weight_tier 'W1'"]
        );
    }

    #[test]
    fn completeness_reports_all_missing_at_once() {
        let d = docs(
            json!({ "P2": {} }),
            json!([{ "id": "P3" }, { "id": "P1" }, { "id": "P2" }]),
            json!([]),
        );
        let r = run_rule(&LinkCompletenessRule, &d);
        assert_eq!(
            r.fixes_needed(),
            vec!["Products in products.json but not in links: ['P1', 'P3']"]
        );
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn references_confirm_only_valid_axes() {
        let d = docs(
            json!({ "P1": { "zones": ["Z1"], "weight_tiers": ["W7"] } }),
            json!([]),
            json!([]),
        );
        let r = run_rule(&LinkReferencesRule, &d);
        assert_eq!(r.correct_items(), vec!["All zones in links are valid"]);
        assert_eq!(r.count(Severity::Error), 0);
    }
}
