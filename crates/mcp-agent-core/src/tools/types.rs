//! Tool-related type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Function declaration advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input parameters as an OpenAPI-style JSON Schema object
    pub parameters: Value,
}

impl ToolSchema {
    /// Create a new tool schema
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Whether the tool takes any parameters
    pub fn has_parameters(&self) -> bool {
        self.parameters
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|props| !props.is_empty())
    }
}

/// Object schema with no properties
pub fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}
