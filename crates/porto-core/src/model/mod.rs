//! Typed views over the seven data documents.
//!
//! Every field the validator tolerates being absent is an `Option` or defaults
//! to empty, so a missing key degrades to "nothing to check" instead of a
//! lookup failure. Unknown fields are ignored; the JSON schemas own the full
//! shape of each file.
//!
//! Only fields some rule reads are typed. Everything else stays out of the
//! structs, so an odd shape in, say, a localised zone `name` cannot stop a run.
//!
//! Entity ids (`products[].id`, `zones[].id`, `services[].id`) are required.
//! A document that does not fit its typed shape is rejected by the loader the
//! same way as malformed JSON.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `null` reads as an empty map; objects keep document order.
fn null_as_empty<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    Ok(Option::<IndexMap<String, V>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The seven documents loaded by a link validation run, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKind {
    DataLinks,
    Products,
    Zones,
    WeightTiers,
    Services,
    Prices,
    Dimensions,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 7] = [
        DocumentKind::DataLinks,
        DocumentKind::Products,
        DocumentKind::Zones,
        DocumentKind::WeightTiers,
        DocumentKind::Services,
        DocumentKind::Prices,
        DocumentKind::Dimensions,
    ];

    /// Entity name as used in `mappings.json` (`schemas/<entity>.schema.json`).
    pub fn entity(&self) -> &'static str {
        match self {
            Self::DataLinks => "data_links",
            Self::Products => "products",
            Self::Zones => "zones",
            Self::WeightTiers => "weight_tiers",
            Self::Services => "services",
            Self::Prices => "prices",
            Self::Dimensions => "dimensions",
        }
    }
}

/// `{weight, dimension, price, currency}`; each document carries a subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitBlock {
    pub weight: Option<String>,
    pub dimension: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
}

// ---------------------------------------------------------------------------
// data_links.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLinksDoc {
    pub unit: UnitBlock,
    #[serde(deserialize_with = "null_as_empty")]
    pub dependencies: IndexMap<String, DependencyEntry>,
    #[serde(deserialize_with = "null_as_empty")]
    pub links: IndexMap<String, LinkEntry>,
    pub global_settings: GlobalSettings,
}

/// Declared applicability of one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkEntry {
    pub zones: Vec<String>,
    pub weight_tiers: Vec<String>,
}

impl LinkEntry {
    pub fn zone_set(&self) -> BTreeSet<&str> {
        self.zones.iter().map(String::as_str).collect()
    }

    pub fn weight_tier_set(&self) -> BTreeSet<&str> {
        self.weight_tiers.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyEntry {
    pub file: Option<String>,
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub price_source: Option<String>,
    pub lookup_method: LookupMethod,
    pub available_services: Vec<String>,
}

/// Self-description of where prices live and how they are matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupMethod {
    pub file: Option<String>,
    pub array: Option<String>,
    #[serde(rename = "match", deserialize_with = "null_as_empty")]
    pub match_keys: IndexMap<String, Value>,
}

// ---------------------------------------------------------------------------
// products.json / zones.json / weight_tiers.json / services.json / dimensions.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductsDoc {
    pub unit: UnitBlock,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub supported_zones: Vec<String>,
    #[serde(default)]
    pub weight_tier: Option<String>,
}

impl Product {
    pub fn zone_set(&self) -> BTreeSet<&str> {
        self.supported_zones.iter().map(String::as_str).collect()
    }

    /// The product's own tier; an empty string counts as unset.
    pub fn own_weight_tier(&self) -> Option<&str> {
        self.weight_tier.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesDoc {
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTiersDoc {
    pub unit: UnitBlock,
    /// Keyed by tier id; the tier bodies are not inspected.
    pub weight_tiers: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesDoc {
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    /// Discontinuation date; `None` means the service is active.
    #[serde(default)]
    pub effective_to: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionsDoc {
    pub unit: UnitBlock,
}

// ---------------------------------------------------------------------------
// prices.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricesDoc {
    pub unit: UnitBlock,
    pub prices: Option<PriceTables>,
}

impl PricesDoc {
    /// True when `prices.product_prices` is present (even if empty).
    pub fn has_product_prices_path(&self) -> bool {
        self.prices
            .as_ref()
            .is_some_and(|p| p.product_prices.is_some())
    }

    pub fn product_prices(&self) -> &[ProductPrice] {
        self.prices
            .as_ref()
            .and_then(|p| p.product_prices.as_deref())
            .unwrap_or_default()
    }

    pub fn service_prices(&self) -> &[ServicePrice] {
        self.prices
            .as_ref()
            .and_then(|p| p.service_prices.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTables {
    pub product_prices: Option<Vec<ProductPrice>>,
    pub service_prices: Option<Vec<ServicePrice>>,
}

/// One `prices.product_prices[]` entry.
///
/// The whole object is kept so [`field_names`](Self::field_names) sees every
/// key, including ones whose value is `null`. The match fields are read as
/// strings; any other value never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ProductPrice {
    pub product_id: Option<String>,
    pub zone: Option<String>,
    pub weight_tier: Option<String>,
    pub fields: Map<String, Value>,
}

impl From<Map<String, Value>> for ProductPrice {
    fn from(fields: Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            product_id: text("product_id"),
            zone: text("zone"),
            weight_tier: text("weight_tier"),
            fields,
        }
    }
}

impl From<ProductPrice> for Map<String, Value> {
    fn from(price: ProductPrice) -> Self {
        price.fields
    }
}

impl ProductPrice {
    /// Keys present on this entry, whatever their value.
    pub fn field_names(&self) -> BTreeSet<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn matches(&self, product_id: &str, zone: &str, weight_tier: &str) -> bool {
        self.product_id.as_deref() == Some(product_id)
            && self.zone.as_deref() == Some(zone)
            && self.weight_tier.as_deref() == Some(weight_tier)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePrice {
    pub service_id: Option<String>,
    pub price: Vec<PriceHistoryItem>,
}

impl ServicePrice {
    /// First non-null `effective_to` in history order. Later entries are not
    /// consulted, even if they disagree.
    pub fn first_effective_to(&self) -> Option<&str> {
        self.price.iter().find_map(|p| p.effective_to.as_deref())
    }
}

/// Only `effective_to` is read; amounts and start dates are left to the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceHistoryItem {
    pub effective_to: Option<String>,
}
