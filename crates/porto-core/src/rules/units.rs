//! Unit agreement between `data_links.json` and the documents carrying units.

use crate::constants::{
    EXPECTED_CURRENCY, EXPECTED_DIMENSION_UNIT, EXPECTED_PRICE_UNIT, EXPECTED_WEIGHT_UNIT,
};
use crate::findings::ValidationResults;
use crate::rules::{Rule, RuleContext};
use crate::units::{check_unit_consistency, UnitObservation as Obs};

pub struct UnitsRule;

impl Rule for UnitsRule {
    fn id(&self) -> &str {
        "units.consistency"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let docs = ctx.docs;
        let files = ctx.files;
        let links = &docs.data_links.unit;

        check_unit_consistency(
            "weight",
            EXPECTED_WEIGHT_UNIT,
            &[
                Obs::new(&files.data_links, links.weight.as_deref()),
                Obs::new(&files.products, docs.products.unit.weight.as_deref()),
                Obs::new(&files.weight_tiers, docs.weight_tiers.unit.weight.as_deref()),
            ],
            results,
        );
        check_unit_consistency(
            "dimension",
            EXPECTED_DIMENSION_UNIT,
            &[
                Obs::new(&files.data_links, links.dimension.as_deref()),
                Obs::new(&files.products, docs.products.unit.dimension.as_deref()),
                Obs::new(&files.dimensions, docs.dimensions.unit.dimension.as_deref()),
            ],
            results,
        );
        check_unit_consistency(
            "price",
            EXPECTED_PRICE_UNIT,
            &[
                Obs::new(&files.data_links, links.price.as_deref()),
                Obs::new(&files.prices, docs.prices.unit.price.as_deref()),
            ],
            results,
        );
        check_unit_consistency(
            "currency",
            EXPECTED_CURRENCY,
            &[
                Obs::new(&files.data_links, links.currency.as_deref()),
                Obs::new(&files.prices, docs.prices.unit.currency.as_deref()),
            ],
            results,
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::loader::DocumentSet;
    use crate::rules::testing::{doc, run_rule};

    #[test]
    fn canonical_units_everywhere() {
        let d = DocumentSet {
            data_links: doc(json!({ "unit": { "weight": "g", "dimension": "mm", "price": "cents", "currency": "EUR" } })),
            products: doc(json!({ "unit": { "weight": "g", "dimension": "mm" } })),
            weight_tiers: doc(json!({ "unit": { "weight": "g" } })),
            dimensions: doc(json!({ "unit": { "dimension": "mm" } })),
            prices: doc(json!({ "unit": { "price": "cents", "currency": "EUR" } })),
            ..DocumentSet::default()
        };
        let r = run_rule(&UnitsRule, &d);
        assert_eq!(
            r.correct_items(),
            vec![
                "Unit weight 'g' is consistent across all files",
                "Unit dimension 'mm' is consistent across all files",
                "Unit price 'cents' is consistent across all files",
                "Unit currency 'EUR' is consistent across all files",
            ]
        );
    }

    #[test]
    fn absent_units_are_consistent_nulls() {
        let r = run_rule(&UnitsRule, &DocumentSet::default());
        assert_eq!(r.warnings().len(), 4);
        assert!(r.warnings()[2].starts_with("Unit price 'null' is consistent but verify"));
    }

    #[test]
    fn currency_mismatch_is_error() {
        let d = DocumentSet {
            data_links: doc(json!({ "unit": { "currency": "EUR" } })),
            prices: doc(json!({ "unit": { "currency": "USD" } })),
            ..DocumentSet::default()
        };
        let r = run_rule(&UnitsRule, &d);
        assert_eq!(
            r.errors(),
            vec!["Currency unit mismatch: data_links.json=EUR, prices.json=USD. Expected: 'EUR'"]
        );
    }
}
