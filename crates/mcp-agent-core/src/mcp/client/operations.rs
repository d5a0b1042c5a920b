//! MCP tool operations

use super::McpClient;
use super::super::error::McpError;
use super::super::protocol::methods;
use super::super::types::{ListToolsResult, McpTool, McpToolResult};
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::{instrument, warn};

impl McpClient {
    /// List available tools, following pagination cursors
    #[instrument(skip(self), level = "debug")]
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpError> {
        self.ensure_initialized()?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let page: ListToolsResult = self.call(methods::TOOLS_LIST, params).await?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if next.is_empty() => break,
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    warn!("MCP server repeated tools/list cursor '{}', stopping", next);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        *self.tools.write() = tools.clone();
        Ok(tools)
    }

    /// Call a tool
    #[instrument(skip(self, arguments), fields(tool_name = %name))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        self.ensure_initialized()?;

        let params = json!({
            "name": name,
            "arguments": arguments
        });

        self.call(methods::TOOLS_CALL, Some(params)).await
    }

    /// Ping the server
    pub async fn ping(&self) -> Result<(), McpError> {
        let _: Value = self.call(methods::PING, None).await?;
        Ok(())
    }
}
