//! Conversation content model
//!
//! The serde shape matches Gemini's `Content`/`Part` wire format, so the
//! same values are stored in sessions, carried by events and sent to the
//! model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Who produced a piece of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Client-assigned call id, pairs the call with its response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// The result of a function call, sent back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

/// One piece of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        Self::FunctionCall(FunctionCall {
            id: None,
            name: name.into(),
            args,
        })
    }

    pub fn function_response(
        id: Option<String>,
        name: impl Into<String>,
        response: Value,
    ) -> Self {
        Self::FunctionResponse(FunctionResponse {
            id,
            name: name.into(),
            response,
        })
    }

    /// Text of a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "text={:?}", text),
            Self::FunctionCall(call) => {
                write!(f, "function_call={}({})", call.name, call.args)
            }
            Self::FunctionResponse(response) => {
                write!(f, "function_response={}: {}", response.name, response.response)
            }
        }
    }
}

/// A message: a role plus ordered parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// A user message holding a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// A model message holding a single text part
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    pub fn function_responses(&self) -> Vec<&FunctionResponse> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionResponse(response) => Some(response),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role={} parts=[", self.role)?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let content = Content::new(
            Role::Model,
            vec![
                Part::text("Let me compute that."),
                Part::function_call("multiply", json!({"a": 475, "b": 23})),
            ],
        );

        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({
                "role": "model",
                "parts": [
                    {"text": "Let me compute that."},
                    {"functionCall": {"name": "multiply", "args": {"a": 475, "b": 23}}}
                ]
            })
        );
    }

    #[test]
    fn test_text_and_calls() {
        let content = Content::new(
            Role::Model,
            vec![
                Part::text("The answer "),
                Part::function_call("noop", json!({})),
                Part::text("is 10925."),
            ],
        );

        assert_eq!(content.text(), "The answer is 10925.");
        assert_eq!(content.function_calls()[0].name, "noop");
        assert!(content.function_responses().is_empty());
    }

    #[test]
    fn test_display() {
        let content = Content::new(
            Role::User,
            vec![Part::function_response(
                Some("adk-1".into()),
                "multiply",
                json!({"result": "10925"}),
            )],
        );
        assert_eq!(
            content.to_string(),
            r#"role=user parts=[function_response=multiply: {"result":"10925"}]"#
        );
        assert_eq!(
            Content::user_text("hi").to_string(),
            r#"role=user parts=[text="hi"]"#
        );
    }
}
