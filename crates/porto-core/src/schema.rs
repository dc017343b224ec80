//! JSON Schema validation of mapped data files.
//!
//! Only the schema/data pairs listed in `mappings.json` are checked. The
//! validator itself sits behind [`SchemaValidator`]; [`Draft7Validator`] is
//! the `jsonschema`-backed implementation.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::config::Mappings;
use crate::loader::{read_document, LoadFailure};

/// First violation reported for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub message: String,
    /// Dotted instance path (`products.0.id`); empty for the document root.
    pub path: String,
}

pub trait SchemaValidator {
    fn validate(&self, schema: &Value, data: &Value) -> Result<(), SchemaViolation>;
}

/// Draft 7 validation via the `jsonschema` crate.
#[cfg(feature = "schema")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Draft7Validator;

#[cfg(feature = "schema")]
impl SchemaValidator for Draft7Validator {
    fn validate(&self, schema: &Value, data: &Value) -> Result<(), SchemaViolation> {
        let compiled = jsonschema::JSONSchema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .compile(schema)
            .map_err(|e| SchemaViolation {
                message: format!("invalid schema: {e}"),
                path: String::new(),
            })?;

        let result = compiled.validate(data);
        match result {
            Ok(()) => Ok(()),
            Err(mut errors) => {
                let first = errors.next().map(|e| SchemaViolation {
                    message: e.to_string(),
                    path: dotted_path(&e.instance_path.to_string()),
                });
                Err(first.unwrap_or_else(|| SchemaViolation {
                    message: "validation failed".to_string(),
                    path: String::new(),
                }))
            }
        }
    }
}

/// `/products/0/id` -> `products.0.id`
pub fn dotted_path(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchemaOutcome {
    Valid,
    MissingFile { path: String },
    InvalidJson { path: String, detail: String },
    Invalid(SchemaViolation),
}

impl SchemaOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaFileReport {
    pub schema_path: String,
    pub data_path: String,
    pub outcome: SchemaOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub files: Vec<SchemaFileReport>,
}

impl SchemaReport {
    pub fn failed(&self) -> impl Iterator<Item = &SchemaFileReport> {
        self.files.iter().filter(|f| !f.outcome.is_valid())
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed().next().is_some() {
            1
        } else {
            0
        }
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::from("Validating JSON schemas...\n");
        let _ = writeln!(out, "{rule}");

        for f in &self.files {
            let data = &f.data_path;
            match &f.outcome {
                SchemaOutcome::Valid => {
                    let _ = writeln!(out, "✓ {data}");
                }
                SchemaOutcome::MissingFile { path } => {
                    let _ = writeln!(out, "✗ {data}: File not found - {path}");
                }
                SchemaOutcome::InvalidJson { path, detail } => {
                    let _ = writeln!(out, "✗ {data}: Invalid JSON - {path}: {detail}");
                }
                SchemaOutcome::Invalid(v) => {
                    let _ = writeln!(out, "✗ {data}: Validation failed");
                    let _ = writeln!(out, "  Error: {}", v.message);
                    let _ = writeln!(out, "  Path: {}", v.path);
                }
            }
        }

        let _ = writeln!(out, "{rule}");
        let failed: Vec<&SchemaFileReport> = self.failed().collect();
        if failed.is_empty() {
            let _ = writeln!(out, "✓ All {} files valid!", self.files.len());
        } else {
            let _ = writeln!(out, "✗ {} file(s) failed validation:", failed.len());
            for f in failed {
                let _ = writeln!(out, "  - {}", f.data_path);
            }
        }
        out
    }
}

/// Validate every mapped data file against its schema, in mapping order.
pub fn validate_all_schemas(
    root: &Path,
    mappings: &Mappings,
    validator: &dyn SchemaValidator,
) -> SchemaReport {
    let files = mappings
        .schema_data_pairs()
        .map(|(schema_rel, data_rel)| {
            let outcome = check_pair(root, schema_rel, data_rel, validator);
            if !outcome.is_valid() {
                tracing::debug!(data = data_rel, ?outcome, "schema validation failed");
            }
            SchemaFileReport {
                schema_path: schema_rel.to_string(),
                data_path: data_rel.to_string(),
                outcome,
            }
        })
        .collect();
    SchemaReport { files }
}

fn check_pair(
    root: &Path,
    schema_rel: &str,
    data_rel: &str,
    validator: &dyn SchemaValidator,
) -> SchemaOutcome {
    let load = |rel: &str| -> Result<Value, SchemaOutcome> {
        read_document::<Value>(&root.join(rel)).map_err(|failure| match failure {
            LoadFailure::Missing { path } => SchemaOutcome::MissingFile {
                path: path.display().to_string(),
            },
            LoadFailure::Invalid { path, detail } | LoadFailure::Unreadable { path, detail } => {
                SchemaOutcome::InvalidJson {
                    path: path.display().to_string(),
                    detail,
                }
            }
        })
    };

    let schema = match load(schema_rel) {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };
    let data = match load(data_rel) {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };
    match validator.validate(&schema, &data) {
        Ok(()) => SchemaOutcome::Valid,
        Err(v) => SchemaOutcome::Invalid(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Accepts only objects; lets the report plumbing be tested on its own.
    struct ObjectsOnly;

    impl SchemaValidator for ObjectsOnly {
        fn validate(&self, _schema: &Value, data: &Value) -> Result<(), SchemaViolation> {
            if data.is_object() {
                Ok(())
            } else {
                Err(SchemaViolation {
                    message: "not an object".into(),
                    path: String::new(),
                })
            }
        }
    }

    fn project() -> (tempfile::TempDir, Mappings) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("schemas")).unwrap();
        std::fs::create_dir_all(root.join("data")).unwrap();
        for name in ["a", "b", "c"] {
            std::fs::write(root.join(format!("schemas/{name}.schema.json")), "{}").unwrap();
        }
        std::fs::write(root.join("data/a.json"), "{}").unwrap();
        std::fs::write(root.join("data/b.json"), "[1]").unwrap();
        std::fs::write(root.join("data/c.json"), "{").unwrap();
        let m = Mappings::from_pairs([
            ("schemas/a.schema.json", "data/a.json"),
            ("schemas/b.schema.json", "data/b.json"),
            ("schemas/c.schema.json", "data/c.json"),
            ("schemas/a.schema.json", "data/a.json"),
            ("schemas/d.schema.json", "data/d.json"),
        ]);
        (dir, m)
    }

    #[test]
    fn report_classifies_each_pair() {
        let (dir, m) = project();
        let report = validate_all_schemas(dir.path(), &m, &ObjectsOnly);
        let outcomes: Vec<&SchemaOutcome> = report.files.iter().map(|f| &f.outcome).collect();
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_valid());
        assert!(matches!(outcomes[1], SchemaOutcome::Invalid(_)));
        assert!(matches!(outcomes[2], SchemaOutcome::InvalidJson { .. }));
        assert!(matches!(outcomes[3], SchemaOutcome::MissingFile { .. }));
        assert_eq!(report.exit_code(), 1);

        let text = report.render();
        assert!(text.contains("✓ data/a.json\n"));
        assert!(text.contains("✗ data/b.json: Validation failed\n  Error: not an object\n"));
        assert!(text.contains("✗ 3 file(s) failed validation:"));
    }

    #[test]
    fn all_valid_exits_zero() {
        let report = SchemaReport {
            files: vec![SchemaFileReport {
                schema_path: "schemas/a.schema.json".into(),
                data_path: "data/a.json".into(),
                outcome: SchemaOutcome::Valid,
            }],
        };
        assert_eq!(report.exit_code(), 0);
        assert!(report.render().contains("✓ All 1 files valid!"));
    }

    #[test]
    fn dotted_path_from_pointer() {
        assert_eq!(dotted_path("/products/0/id"), "products.0.id");
        assert_eq!(dotted_path(""), "");
        assert_eq!(dotted_path("/a~1b"), "a/b");
    }

    #[cfg(feature = "schema")]
    #[test]
    fn draft7_reports_first_violation_with_path() {
        let schema = json!({
            "type": "object",
            "properties": {
                "zones": { "type": "array", "items": { "type": "object", "required": ["id"] } }
            }
        });
        assert!(Draft7Validator
            .validate(&schema, &json!({ "zones": [{ "id": "Z1" }] }))
            .is_ok());
        let err = Draft7Validator
            .validate(&schema, &json!({ "zones": [{ "name": "x" }] }))
            .unwrap_err();
        assert_eq!(err.path, "zones.0");
        assert!(err.message.contains("id"));
    }
}
