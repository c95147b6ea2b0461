//! # Schema Validation
//!
//! Checks a JSON instance against a resolved Iglu schema document. A failed
//! check reports every violation, each with the JSON Pointer of the
//! offending value and the schema keyword that rejected it, tagged with the
//! [`SchemaKey`] the instance claimed to conform to.

use std::fmt;

use iglu_core::SchemaKey;
use jsonschema::{Draft, Retrieve, Uri, ValidationError, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

/// `$schema` values the `jsonschema` crate recognises as drafts.
const JSON_SCHEMA_META_HOST: &str = "json-schema.org/";

/// Retriever that resolves every external `$ref` to the permissive schema.
///
/// Prevents the jsonschema crate from making network requests while a
/// schema is compiled.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        _uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(serde_json::json!({}))
    }
}

#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The instance did not conform to the schema.
    #[error("{0}")]
    ValidationFailed(Violations),

    /// The schema document itself could not be compiled.
    #[error("schema {key} does not compile: {reason}")]
    UncompilableSchema { key: SchemaKey, reason: String },
}

/// One rejected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the rejected value; empty for the instance root.
    pub pointer: String,
    /// Schema keyword that rejected it (`required`, `type`, ...), when known.
    pub keyword: Option<String>,
    pub message: String,
}

impl Violation {
    fn from_error(error: &ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = schema_path
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
        Self {
            pointer: error.instance_path.to_string(),
            keyword,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.pointer.is_empty() { "/" } else { &self.pointer };
        match &self.keyword {
            Some(keyword) => write!(f, "at {at}: {} [{keyword}]", self.message),
            None => write!(f, "at {at}: {}", self.message),
        }
    }
}

/// Every violation of one instance against the schema named by `key`.
/// Never empty when produced by [`StructuralValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations {
    key: SchemaKey,
    items: Vec<Violation>,
}

impl Violations {
    pub fn new(key: SchemaKey, items: Vec<Violation>) -> Self {
        Self { key, items }
    }

    pub fn key(&self) -> &SchemaKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.items.iter()
    }

    /// True if some violation sits at pointer `needle` or its message contains it.
    pub fn mentions(&self, needle: &str) -> bool {
        self.items
            .iter()
            .any(|v| v.pointer == needle || v.message.contains(needle))
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s) of {}", self.items.len(), self.key)?;
        for violation in &self.items {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Structural validator backed by the `jsonschema` crate.
///
/// Holds no schemas of its own; callers pass the resolved schema document
/// for each check. `StructuralValidator` is `Send + Sync`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralValidator {
    draft: Draft,
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self {
            draft: Draft::Draft4,
        }
    }
}

impl StructuralValidator {
    /// Validator that compiles schemas lacking a standard `$schema`
    /// under the given draft.
    pub fn with_draft(draft: Draft) -> Self {
        Self { draft }
    }

    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(self.draft);
        opts.with_retriever(OfflineRetriever);
        opts
    }

    /// Compile the schema document published under `key`.
    ///
    /// # Errors
    ///
    /// `SchemaValidationError::UncompilableSchema` if the document is not a
    /// valid JSON Schema.
    pub fn compile(
        &self,
        key: &SchemaKey,
        schema: &Value,
    ) -> Result<Validator, SchemaValidationError> {
        self.build_options()
            .build(&strip_foreign_meta_schema(schema))
            .map_err(|e| SchemaValidationError::UncompilableSchema {
                key: key.clone(),
                reason: e.to_string(),
            })
    }

    /// Check `instance` against `schema`, the document published under `key`.
    pub fn validate(
        &self,
        key: &SchemaKey,
        schema: &Value,
        instance: &Value,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.compile(key, schema)?;
        if validator.is_valid(instance) {
            return Ok(());
        }
        let items = validator
            .iter_errors(instance)
            .map(|e| Violation::from_error(&e))
            .collect();
        Err(SchemaValidationError::ValidationFailed(Violations::new(
            key.clone(),
            items,
        )))
    }

    /// Returns true if `instance` conforms to `schema`. A schema that does
    /// not compile accepts nothing.
    pub fn is_valid(&self, schema: &Value, instance: &Value) -> bool {
        self.build_options()
            .build(&strip_foreign_meta_schema(schema))
            .is_ok_and(|v| v.is_valid(instance))
    }
}

/// Drop a `$schema` that does not name a json-schema.org draft, such as the
/// Iglu self-describing meta-schema.
fn strip_foreign_meta_schema(schema: &Value) -> Value {
    let mut prepared = schema.clone();
    if let Value::Object(map) = &mut prepared {
        let foreign = map
            .get("$schema")
            .and_then(Value::as_str)
            .is_some_and(|uri| !uri.contains(JSON_SCHEMA_META_HOST));
        if foreign {
            map.remove("$schema");
        }
    }
    prepared
}
