//! MCP Tool Adapter
//!
//! Wraps tools discovered on an MCP server so the agent can call them like
//! any other tool.

use super::base::Tool;
use super::schema::to_gemini_schema;
use super::types::ToolSchema;
use crate::error::AgentResult;
use crate::mcp::{McpClient, McpTool, McpToolResult};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Adapter that exposes one MCP tool as an agent [`Tool`]
#[derive(Clone)]
pub struct McpToolAdapter {
    mcp_tool: McpTool,
    client: Arc<McpClient>,
    /// Input schema converted once at construction
    parameters: Value,
}

impl McpToolAdapter {
    /// Create a new adapter for an MCP tool
    pub fn new(mcp_tool: McpTool, client: Arc<McpClient>) -> Self {
        let parameters = to_gemini_schema(&mcp_tool.input_schema);
        Self {
            mcp_tool,
            client,
            parameters,
        }
    }

    /// Get the original MCP tool definition
    pub fn mcp_tool(&self) -> &McpTool {
        &self.mcp_tool
    }

    /// Function response payload for a tool result
    fn convert_result(result: &McpToolResult) -> Value {
        if result.is_error {
            json!({ "error": result.text() })
        } else {
            json!({ "result": result.text() })
        }
    }
}

impl std::fmt::Debug for McpToolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolAdapter")
            .field("name", &self.mcp_tool.name)
            .finish()
    }
}

#[async_trait]
impl Tool for McpToolAdapter {
    fn name(&self) -> &str {
        &self.mcp_tool.name
    }

    fn description(&self) -> &str {
        self.mcp_tool.description.as_deref().unwrap_or_default()
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(self.name(), self.description(), self.parameters.clone())
    }

    #[instrument(skip(self, args), fields(tool_name = %self.mcp_tool.name))]
    async fn execute(&self, args: Value) -> AgentResult<Value> {
        // Models omit `args` for parameterless calls
        let arguments = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        let result = self.client.call_tool(&self.mcp_tool.name, arguments).await?;
        debug!(is_error = result.is_error, "MCP tool returned");

        Ok(Self::convert_result(&result))
    }
}
