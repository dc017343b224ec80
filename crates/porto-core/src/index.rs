//! Lookup structures built from a loaded `DocumentSet`.

use std::collections::{BTreeMap, BTreeSet};

use crate::loader::DocumentSet;
use crate::model::{Product, ProductPrice, Service, ServicePrice, Zone};

/// Id-keyed views over the documents. Borrowed; never outlives the run.
#[derive(Debug, Clone)]
pub struct LookupIndex<'a> {
    /// Last record wins on duplicate ids.
    pub product_dict: BTreeMap<&'a str, &'a Product>,
    pub zone_ids: BTreeMap<&'a str, &'a Zone>,
    pub weight_tier_ids: BTreeSet<&'a str>,
    pub services_by_id: BTreeMap<&'a str, &'a Service>,
    pub product_prices: &'a [ProductPrice],
    pub service_prices: &'a [ServicePrice],
    pub all_data_files: &'a BTreeSet<String>,
}

impl<'a> LookupIndex<'a> {
    pub fn build(docs: &'a DocumentSet, all_data_files: &'a BTreeSet<String>) -> Self {
        Self {
            product_dict: docs
                .products
                .products
                .iter()
                .map(|p| (p.id.as_str(), p))
                .collect(),
            zone_ids: docs.zones.zones.iter().map(|z| (z.id.as_str(), z)).collect(),
            weight_tier_ids: docs
                .weight_tiers
                .weight_tiers
                .keys()
                .map(String::as_str)
                .collect(),
            services_by_id: docs
                .services
                .services
                .iter()
                .map(|s| (s.id.as_str(), s))
                .collect(),
            product_prices: docs.prices.product_prices(),
            service_prices: docs.prices.service_prices(),
            all_data_files,
        }
    }

    /// Same map as `services_by_id`, named for membership checks.
    pub fn service_ids(&self) -> &BTreeMap<&'a str, &'a Service> {
        &self.services_by_id
    }

    /// Weight tiers with at least one product price for `product_id`.
    pub fn price_weight_tiers(&self, product_id: &str) -> BTreeSet<&'a str> {
        self.product_prices
            .iter()
            .filter(|p| p.product_id.as_deref() == Some(product_id))
            .filter_map(|p| p.weight_tier.as_deref())
            .collect()
    }

    pub fn has_price(&self, product_id: &str, zone: &str, weight_tier: &str) -> bool {
        self.product_prices
            .iter()
            .any(|p| p.matches(product_id, zone, weight_tier))
    }

    /// Service ids that appear on at least one service price.
    pub fn priced_service_ids(&self) -> BTreeSet<&'a str> {
        self.service_prices
            .iter()
            .filter_map(|p| p.service_id.as_deref())
            .collect()
    }
}
