//! # Self-Describing JSON
//!
//! An envelope `{"schema": "<iglu key>", "data": <any JSON>}` that carries
//! the reference to the schema its payload conforms to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IgluError;
use crate::key::SchemaKey;

/// A JSON payload paired with the key of its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDescribingJson {
    pub schema: SchemaKey,
    pub data: Value,
}

impl SelfDescribingJson {
    pub fn new(schema: SchemaKey, data: Value) -> Self {
        Self { schema, data }
    }

    /// Interpret an arbitrary JSON value as an envelope.
    ///
    /// `data` may be any JSON value, including `null`, as long as the
    /// property is present.
    ///
    /// # Errors
    ///
    /// - [`IgluError::NotSelfDescribing`] if `schema` or `data` is absent,
    ///   or if `schema` is not a string.
    /// - [`IgluError::MalformedIdentifier`] if `schema` is not a valid key.
    pub fn parse(json: &Value) -> Result<Self, IgluError> {
        let schema = Self::schema_key_of(json)?;
        let data = json
            .get("data")
            .ok_or(IgluError::NotSelfDescribing { missing: "data" })?;
        Ok(Self::new(schema, data.clone()))
    }

    /// Extract only the schema key of an envelope.
    pub fn schema_key_of(json: &Value) -> Result<SchemaKey, IgluError> {
        let uri = json
            .get("schema")
            .and_then(Value::as_str)
            .ok_or(IgluError::NotSelfDescribing { missing: "schema" })?;
        SchemaKey::parse(uri)
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "schema": self.schema.to_uri(),
            "data": self.data,
        })
    }
}
