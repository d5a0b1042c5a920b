//! Conversions from foreign error types into AgentError

use super::types::{AgentError, UnifiedError};
use crate::mcp::McpError;

impl From<McpError> for AgentError {
    fn from(err: McpError) -> Self {
        Self::Mcp {
            message: err.to_string(),
            code: err.error_code().to_string(),
            retryable: err.is_retryable(),
            context: err.context().map(str::to_string),
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            url: err.url().map(|u| u.to_string()),
            status_code: err.status().map(|s| s.as_u16()),
            context: None,
        }
    }
}
