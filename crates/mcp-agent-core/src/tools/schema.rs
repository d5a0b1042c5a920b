//! JSON Schema sanitizing for Gemini function declarations
//!
//! MCP servers describe tool inputs with full JSON Schema, while Gemini
//! accepts only an OpenAPI subset and rejects requests carrying unknown
//! keywords such as `additionalProperties` or `$schema`.

use super::types::empty_object_schema;
use serde_json::{Map, Value};

/// Keywords Gemini accepts in a function parameter schema
const SUPPORTED_KEYWORDS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
    "minimum",
    "maximum",
    "anyOf",
    "title",
];

/// Convert an MCP input schema into a Gemini-compatible parameter schema
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(obj) if !obj.is_empty() => {
            let mut sanitized = sanitize_object(obj);
            sanitized
                .entry("type")
                .or_insert_with(|| Value::String("object".to_string()));
            if sanitized.get("type").and_then(Value::as_str) == Some("object") {
                sanitized
                    .entry("properties")
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            Value::Object(sanitized)
        }
        _ => empty_object_schema(),
    }
}

fn sanitize(schema: &Value) -> Value {
    match schema {
        Value::Object(obj) => Value::Object(sanitize_object(obj)),
        // `true` and other shorthand schemas accept anything
        _ => Value::Object(Map::new()),
    }
}

fn sanitize_object(obj: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in obj {
        if !SUPPORTED_KEYWORDS.contains(&key.as_str()) {
            continue;
        }

        match key.as_str() {
            "properties" => {
                if let Value::Object(props) = value {
                    let props = props
                        .iter()
                        .map(|(name, prop)| (name.clone(), sanitize(prop)))
                        .collect();
                    out.insert(key.clone(), Value::Object(props));
                }
            }
            "items" => {
                out.insert(key.clone(), sanitize(value));
            }
            "anyOf" => {
                if let Value::Array(variants) = value {
                    out.insert(
                        key.clone(),
                        Value::Array(variants.iter().map(sanitize).collect()),
                    );
                }
            }
            "description" | "title" => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.insert(key.clone(), Value::String(text));
            }
            "type" => insert_type(&mut out, value),
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }

    retain_known_required(&mut out);
    out
}

/// `"type": ["string", "null"]` becomes `"type": "string", "nullable": true`
fn insert_type(out: &mut Map<String, Value>, value: &Value) {
    match value {
        Value::Array(types) => {
            let mut nullable = false;
            let mut chosen = None;
            for ty in types.iter().filter_map(Value::as_str) {
                if ty == "null" {
                    nullable = true;
                } else if chosen.is_none() {
                    chosen = Some(ty.to_string());
                }
            }
            if let Some(ty) = chosen {
                out.insert("type".to_string(), Value::String(ty));
            }
            if nullable {
                out.insert("nullable".to_string(), Value::Bool(true));
            }
        }
        other => {
            out.insert("type".to_string(), other.clone());
        }
    }
}

fn retain_known_required(out: &mut Map<String, Value>) {
    let Some(required) = out.remove("required") else {
        return;
    };

    let known: Vec<Value> = match (required, out.get("properties")) {
        (Value::Array(names), Some(Value::Object(props))) => names
            .into_iter()
            .filter(|name| name.as_str().is_some_and(|n| props.contains_key(n)))
            .collect(),
        _ => Vec::new(),
    };

    if !known.is_empty() {
        out.insert("required".to_string(), Value::Array(known));
    }
}
