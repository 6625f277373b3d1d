//! JSON Schema loading and compilation.
//!
//! Compilation is a configuration step and can fail on its own
//! ([`CoreError::SchemaCompile`]), separately from the document errors a compiled
//! schema reports.

use crate::validation::ValidationError;
use crate::{CoreError, CoreResult};
use serde_json::{json, Value};
use std::path::Path;

/// A schema compiled once and reused for every validation pass.
pub struct CompiledSchema {
    source: Value,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Compile a schema descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaCompile`] if the descriptor is not a usable schema.
    pub fn compile(schema: &Value) -> CoreResult<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| CoreError::SchemaCompile(err.to_string()))?;
        Ok(Self {
            source: schema.clone(),
            validator,
        })
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Every violation of this schema by `instance`, as validation errors.
    pub fn violations(&self, instance: &Value) -> Vec<ValidationError> {
        self.validator
            .iter_errors(instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                let schema_path = error.schema_path.to_string();
                let location = if path.is_empty() { "root" } else { path.as_str() };
                let message = format!("{error} at '{location}'");
                let offending = error.instance.clone().into_owned();
                ValidationError {
                    message,
                    keyword: keyword_from_schema_path(&schema_path),
                    params: Some(json!({
                        "schemaPath": schema_path,
                        "instance": offending,
                    })),
                    path,
                    line_number: None,
                    column_number: None,
                }
            })
            .collect()
    }
}

/// The schema used when none is configured: any object, or an array of any JSON values.
pub fn default_schema() -> Value {
    json!({
        "oneOf": [
            {
                "type": "object",
                "properties": {
                    "example": {"type": "string"},
                    "name": {"type": "string"},
                    "age": {"type": "number"}
                },
                "additionalProperties": true
            },
            {
                "type": "array",
                "items": {
                    "oneOf": [
                        {"type": "object", "additionalProperties": true},
                        {"type": "array", "items": {}},
                        {"type": "string"},
                        {"type": "number"},
                        {"type": "boolean"},
                        {"type": "null"}
                    ]
                }
            }
        ]
    })
}

/// Read a schema descriptor from a JSON file.
///
/// # Errors
///
/// Returns [`CoreError::SchemaRead`] or [`CoreError::SchemaParse`].
pub fn load_schema(path: &Path) -> CoreResult<Value> {
    let text = std::fs::read_to_string(path).map_err(CoreError::SchemaRead)?;
    serde_json::from_str(&text).map_err(CoreError::SchemaParse)
}

fn keyword_from_schema_path(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or("schema")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn keyword_is_last_named_segment() {
        assert_eq!(keyword_from_schema_path("/type"), "type");
        assert_eq!(keyword_from_schema_path("/properties/age/type"), "type");
        assert_eq!(keyword_from_schema_path("/items/oneOf/2"), "oneOf");
        assert_eq!(keyword_from_schema_path(""), "schema");
    }

    #[test]
    fn invalid_schema_is_a_compile_error() {
        let err = CompiledSchema::compile(&json!({"type": 12})).expect_err("bad type keyword");
        assert!(matches!(err, CoreError::SchemaCompile(_)));
    }

    #[test]
    fn loads_schema_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"type": "array"}}"#).expect("write schema");

        let schema = load_schema(file.path()).expect("load schema");
        assert_eq!(schema, json!({"type": "array"}));
        let compiled = CompiledSchema::compile(&schema).expect("compile");
        assert_eq!(compiled.source(), &schema);
    }

    #[test]
    fn unreadable_schema_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_schema(&dir.path().join("missing.json")).expect_err("missing file");
        assert!(matches!(err, CoreError::SchemaRead(_)));
    }

    #[test]
    fn malformed_schema_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{not json").expect("write");
        let err = load_schema(file.path()).expect_err("malformed");
        assert!(matches!(err, CoreError::SchemaParse(_)));
    }
}
