//! Project configuration for porto-core.
//!
//! A porto data repository is described by three files at its root:
//! - `mappings.json`: ordered schema path -> data path pairs (source of truth
//!   for which files exist)
//! - `metadata.json`: generated checksums (see `crate::metadata`)
//! - `porto.toml`: optional `[project]` table with name/version/description
//!
//! The core never reads environment variables on its own. Root discovery takes
//! the environment value as an argument so callers decide where it comes from.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{PortoError, PortoResult};
use crate::findings::quoted_list;
use crate::model::DocumentKind;

pub const MAPPINGS_FILE: &str = "mappings.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const MANIFEST_FILE: &str = "porto.toml";

/// Environment variable naming the project root.
pub const ROOT_ENV: &str = "PORTO_ROOT";

/// Entities every link validation run needs, in load order.
pub const REQUIRED_ENTITIES: [&str; 7] = [
    "data_links",
    "products",
    "zones",
    "weight_tiers",
    "services",
    "prices",
    "dimensions",
];

/// Schema path -> data path pairs loaded from `mappings.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mappings {
    pairs: IndexMap<String, String>,
}

#[derive(Deserialize)]
struct MappingsShape {
    #[serde(default)]
    mappings: Value,
}

impl Mappings {
    pub fn load(path: impl AsRef<Path>) -> PortoResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PortoError::configuration(format!(
                "mappings.json not found at {}. This file is the source of truth for schema-to-data file mappings.",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| PortoError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse `mappings.json` content; `origin` only appears in messages.
    pub fn parse(text: &str, origin: &Path) -> PortoResult<Self> {
        let shape: MappingsShape = serde_json::from_str(text).map_err(|e| {
            PortoError::configuration(format!("Invalid JSON in {}: {e}", origin.display()))
        })?;

        let empty = match &shape.mappings {
            Value::Null => true,
            Value::Object(m) => m.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Bool(b) => !b,
            Value::Number(_) => false,
        };
        if empty {
            return Err(PortoError::configuration(format!(
                "No mappings found in {}",
                origin.display()
            )));
        }
        // serde_json is built with `preserve_order`, so objects keep file order.
        let Value::Object(entries) = shape.mappings else {
            return Err(PortoError::configuration(format!(
                "mappings must be an object, got {}",
                json_kind(&shape.mappings)
            )));
        };

        let mut pairs = IndexMap::with_capacity(entries.len());
        for (schema, data) in entries {
            match data {
                Value::String(s) => {
                    pairs.insert(schema, s);
                }
                other => {
                    return Err(PortoError::configuration(format!(
                        "All mapping values must be strings, got {} for '{schema}'",
                        json_kind(&other)
                    )))
                }
            }
        }
        Ok(Self { pairs })
    }

    pub fn from_pairs<I, S, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(s, d)| (s.into(), d.into())).collect(),
        }
    }

    /// Ordered `(schema path, data path)` pairs, both relative to the root.
    pub fn schema_data_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(s, d)| (s.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Base names of every mapped data file (`products.json`, ...).
    pub fn data_file_names(&self) -> BTreeSet<String> {
        self.pairs.values().map(|d| file_name(d)).collect()
    }

    /// Entity name -> data file base name.
    pub fn entity_file_names(&self) -> BTreeMap<String, String> {
        self.pairs
            .iter()
            .map(|(s, d)| (entity_name(s), file_name(d)))
            .collect()
    }

    /// Data path (relative to the root) mapped for `entity`.
    pub fn data_path(&self, entity: &str) -> Option<&str> {
        self.pairs
            .get(&format!("schemas/{entity}.schema.json"))
            .map(String::as_str)
    }

    pub fn data_file_name(&self, entity: &str) -> PortoResult<String> {
        match self.data_path(entity) {
            Some(path) => Ok(file_name(path)),
            None => {
                let available: Vec<String> = self.pairs.keys().map(|k| entity_name(k)).collect();
                Err(PortoError::configuration(format!(
                    "No mapping found for '{entity}'. Available entities: {}",
                    quoted_list(available)
                )))
            }
        }
    }
}

/// Data file names of the documents a link validation run reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub data_links: String,
    pub products: String,
    pub zones: String,
    pub weight_tiers: String,
    pub services: String,
    pub prices: String,
    pub dimensions: String,
}

impl DataFiles {
    pub fn from_mappings(mappings: &Mappings) -> PortoResult<Self> {
        let names = mappings.entity_file_names();
        let missing: Vec<&str> = REQUIRED_ENTITIES
            .iter()
            .copied()
            .filter(|e| !names.contains_key(*e))
            .collect();
        if !missing.is_empty() {
            return Err(PortoError::configuration(format!(
                "Missing required entities in mappings.json: {}. Available entities: {}. Please update mappings.json to include all required entities.",
                quoted_list(missing),
                quoted_list(names.keys())
            )));
        }

        let get = |entity: &str| names.get(entity).cloned().unwrap_or_default();
        Ok(Self {
            data_links: get("data_links"),
            products: get("products"),
            zones: get("zones"),
            weight_tiers: get("weight_tiers"),
            services: get("services"),
            prices: get("prices"),
            dimensions: get("dimensions"),
        })
    }

    /// `<entity>.json` for every entity.
    pub fn conventional() -> Self {
        Self {
            data_links: "data_links.json".into(),
            products: "products.json".into(),
            zones: "zones.json".into(),
            weight_tiers: "weight_tiers.json".into(),
            services: "services.json".into(),
            prices: "prices.json".into(),
            dimensions: "dimensions.json".into(),
        }
    }

    pub fn file_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::DataLinks => &self.data_links,
            DocumentKind::Products => &self.products,
            DocumentKind::Zones => &self.zones,
            DocumentKind::WeightTiers => &self.weight_tiers,
            DocumentKind::Services => &self.services,
            DocumentKind::Prices => &self.prices,
            DocumentKind::Dimensions => &self.dimensions,
        }
    }
}

/// Resolved locations for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub mappings_path: PathBuf,
    pub metadata_path: PathBuf,
    pub manifest_path: PathBuf,
    pub data_dir: PathBuf,
}

impl ProjectConfig {
    pub fn new(root: impl Into<PathBuf>, mappings: &Mappings) -> Self {
        let root = root.into();
        let data_dir = mappings
            .data_path("data_links")
            .and_then(|p| Path::new(p).parent())
            .map(|p| root.join(p))
            .unwrap_or_else(|| root.join("data"));
        Self {
            mappings_path: root.join(MAPPINGS_FILE),
            metadata_path: root.join(METADATA_FILE),
            manifest_path: root.join(MANIFEST_FILE),
            data_dir,
            root,
        }
    }
}

/// A project root with its mappings loaded.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: ProjectConfig,
    pub mappings: Mappings,
}

impl Project {
    pub fn open(root: impl Into<PathBuf>) -> PortoResult<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(PortoError::configuration(format!(
                "Project root does not exist: {}",
                root.display()
            )));
        }
        let mappings = Mappings::load(root.join(MAPPINGS_FILE))?;
        let config = ProjectConfig::new(root, &mappings);
        validate_config(&config)?;
        Ok(Self { config, mappings })
    }

    pub fn data_files(&self) -> PortoResult<DataFiles> {
        DataFiles::from_mappings(&self.mappings)
    }
}

/// Pick the project root: explicit path, then `env_root`, then the nearest
/// ancestor of `cwd` holding `mappings.json`.
pub fn discover_root(
    explicit: Option<&Path>,
    env_root: Option<&str>,
    cwd: &Path,
) -> PortoResult<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Some(env) = env_root.filter(|s| !s.trim().is_empty()) {
        return Ok(PathBuf::from(env));
    }
    cwd.ancestors()
        .find(|dir| dir.join(MAPPINGS_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            PortoError::configuration(format!(
                "could not find {MAPPINGS_FILE} in {} or any parent directory; pass --root or set {ROOT_ENV}",
                cwd.display()
            ))
        })
}

/// Validate a resolved project configuration.
pub fn validate_config(cfg: &ProjectConfig) -> PortoResult<()> {
    if !cfg.root.is_dir() {
        return Err(PortoError::configuration(format!(
            "Project root is not a directory: {}",
            cfg.root.display()
        )));
    }
    if !cfg.data_dir.starts_with(&cfg.root) {
        return Err(PortoError::configuration(format!(
            "data directory {} is outside the project root",
            cfg.data_dir.display()
        )));
    }
    Ok(())
}

/// Name, version and description recorded in generated metadata.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProjectMeta {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: "porto-data".to_string(),
            version: "0.0.0".to_string(),
            description: String::new(),
        }
    }
}

#[derive(Deserialize, Default)]
struct Manifest {
    #[serde(default)]
    project: ManifestProject,
}

#[derive(Deserialize, Default)]
struct ManifestProject {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

impl ProjectMeta {
    /// Read `[project]` from `porto.toml`. A missing file yields the defaults.
    pub fn load(manifest_path: impl AsRef<Path>) -> PortoResult<Self> {
        let path = manifest_path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| PortoError::io(path, e))?;
        let manifest: Manifest = toml::from_str(&text).map_err(|e| {
            PortoError::configuration(format!("Invalid TOML in {}: {e}", path.display()))
        })?;
        let defaults = Self::default();
        let p = manifest.project;
        Ok(Self {
            name: p.name.unwrap_or(defaults.name),
            version: p.version.unwrap_or(defaults.version),
            description: p.description.unwrap_or(defaults.description),
        })
    }
}

/// `schemas/products.schema.json` -> `products`; `data/products.json` -> `products`.
pub fn entity_name(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_suffix(".schema") {
        Some(s) => s.to_string(),
        None => stem,
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mappings() -> Mappings {
        Mappings::from_pairs(
            REQUIRED_ENTITIES
                .iter()
                .map(|e| (format!("schemas/{e}.schema.json"), format!("data/{e}.json"))),
        )
    }

    #[test]
    fn parse_keeps_order_and_names() {
        let text = r#"{"mappings": {
            "schemas/zones.schema.json": "data/zones.json",
            "schemas/products.schema.json": "data/products.json"
        }}"#;
        let m = Mappings::parse(text, Path::new("mappings.json")).unwrap();
        let pairs: Vec<_> = m.schema_data_pairs().collect();
        assert_eq!(pairs[0], ("schemas/zones.schema.json", "data/zones.json"));
        assert_eq!(m.data_file_name("products").unwrap(), "products.json");
        assert!(m.data_file_names().contains("zones.json"));
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        let origin = Path::new("mappings.json");
        let e = Mappings::parse(r#"{"mappings": {}}"#, origin).unwrap_err();
        assert!(e.to_string().starts_with("No mappings found"));
        let e = Mappings::parse(r#"{"mappings": ["a"]}"#, origin).unwrap_err();
        assert!(e.to_string().contains("must be an object"));
        let e = Mappings::parse(r#"{"mappings": {"a": 1}}"#, origin).unwrap_err();
        assert!(e.to_string().contains("must be strings"));
        let e = Mappings::parse("{", origin).unwrap_err();
        assert!(e.to_string().starts_with("Invalid JSON in"));
    }

    #[test]
    fn unknown_entity_lists_available() {
        let e = full_mappings().data_file_name("ghost").unwrap_err();
        assert!(e.to_string().contains("'data_links'"));
    }

    #[test]
    fn data_files_require_all_entities() {
        let df = DataFiles::from_mappings(&full_mappings()).unwrap();
        assert_eq!(df, DataFiles::conventional());

        let partial = Mappings::from_pairs([("schemas/products.schema.json", "data/products.json")]);
        let e = DataFiles::from_mappings(&partial).unwrap_err();
        let msg = e.to_string();
        assert!(msg.contains("'data_links'"));
        assert!(msg.contains("Available entities: ['products']"));
    }

    #[test]
    fn project_config_uses_data_links_directory() {
        let m = Mappings::from_pairs([("schemas/data_links.schema.json", "content/data_links.json")]);
        let cfg = ProjectConfig::new("/repo", &m);
        assert_eq!(cfg.data_dir, PathBuf::from("/repo/content"));
        assert_eq!(cfg.metadata_path, PathBuf::from("/repo/metadata.json"));
    }

    #[test]
    fn discover_prefers_explicit_then_env_then_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(MAPPINGS_FILE), "{}").unwrap();

        let explicit = discover_root(Some(Path::new("/x")), Some("/y"), &nested).unwrap();
        assert_eq!(explicit, PathBuf::from("/x"));
        let env = discover_root(None, Some("/y"), &nested).unwrap();
        assert_eq!(env, PathBuf::from("/y"));
        let walked = discover_root(None, Some(""), &nested).unwrap();
        assert_eq!(walked, dir.path());
    }

    #[test]
    fn project_meta_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ProjectMeta::load(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(missing, ProjectMeta::default());

        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "[project]\nname = \"acme-data\"\n").unwrap();
        let meta = ProjectMeta::load(&path).unwrap();
        assert_eq!(meta.name, "acme-data");
        assert_eq!(meta.version, "0.0.0");
    }

    #[test]
    fn entity_name_strips_schema_suffix() {
        assert_eq!(entity_name("schemas/weight_tiers.schema.json"), "weight_tiers");
        assert_eq!(entity_name("data/products.json"), "products");
    }
}
