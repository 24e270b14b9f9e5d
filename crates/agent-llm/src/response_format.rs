//! Structured output descriptions
//!
//! A `ResponseFormat` asks the model to answer in JSON, optionally
//! constrained by a JSON schema. Agents attach it to every completion
//! request; the workflow validates the returned text into typed structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output format requested from the model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text (the provider default)
    #[default]
    Text,
    /// Any valid JSON object
    JsonObject,
    /// JSON matching a named schema
    JsonSchema {
        /// Schema name reported to the provider
        name: String,
        /// JSON Schema of the expected object
        schema: Value,
        /// Ask the provider to enforce the schema strictly
        strict: bool,
    },
}

impl ResponseFormat {
    /// Strict JSON schema output
    ///
    /// Strict mode requires `additionalProperties: false` on the schema
    /// object, which is added when missing.
    pub fn json_schema(name: impl Into<String>, mut schema: Value) -> Self {
        if let Some(obj) = schema.as_object_mut() {
            obj.entry("additionalProperties")
                .or_insert(Value::Bool(false));
        }
        Self::JsonSchema {
            name: name.into(),
            schema,
            strict: true,
        }
    }
}
