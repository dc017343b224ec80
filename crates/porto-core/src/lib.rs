//! porto-core
//!
//! Core primitives for Porto data repositories:
//! - Typed views over the data documents (products, zones, prices, ...)
//! - Cross-file link validation with categorized findings
//! - JSON Schema validation of mapped data files
//! - SHA-256 checksums and `metadata.json` generation
//! - Project configuration (`mappings.json`, `porto.toml`)

pub mod checksum;
pub mod config;
pub mod errors;
pub mod findings;
pub mod index;
pub mod loader;
pub mod metadata;
pub mod model;
pub mod report;
pub mod rules;
pub mod schema;
pub mod units;
pub mod validator;

pub use crate::errors::{PortoError, PortoResult};

/// Canonical literals the link validation checks documents against.
/// These are part of the data contract and must not change.
pub mod constants {
    pub const EXPECTED_LOOKUP_ARRAY: &str = "prices.product_prices";
    pub const EXPECTED_WEIGHT_UNIT: &str = "g";
    pub const EXPECTED_DIMENSION_UNIT: &str = "mm";
    pub const EXPECTED_PRICE_UNIT: &str = "cents";
    pub const EXPECTED_CURRENCY: &str = "EUR";
    /// `lookup_method.match` key that documents the match and is not a field.
    pub const MATCH_DESCRIPTION_KEY: &str = "description";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{DataFiles, Mappings, Project, ProjectConfig, ProjectMeta};
    pub use crate::findings::{Finding, Severity, ValidationResults};
    pub use crate::metadata::{generate_metadata, write_metadata_if_changed, MetadataWrite};
    pub use crate::report::{render, validate_data_links, RenderedReport, ReportMode};
    pub use crate::schema::{validate_all_schemas, SchemaReport, SchemaValidator};
    pub use crate::validator::DataLinksValidator;
    pub use crate::{PortoError, PortoResult};
}
