//! MCP toolset: one server connection and the tools it exposes

use super::client::McpClient;
use super::connection::ConnectionParams;
use super::transport::{McpTransport, SseTransport, StdioTransport};
use super::types::McpServerInfo;
use crate::error::AgentResult;
use crate::tools::{McpToolAdapter, Tool};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Connection to one MCP server plus the agent tools built from its tool list
///
/// The toolset owns the connection; [`McpToolset::close`] releases it.
pub struct McpToolset {
    client: Arc<McpClient>,
    /// Restricts exposed tools to these names when set
    tool_filter: Option<Vec<String>>,
    tools: RwLock<Vec<Arc<dyn Tool>>>,
}

impl McpToolset {
    /// Connect to a server, run the MCP handshake and discover its tools
    #[instrument(skip(params), fields(server = %params), level = "debug")]
    pub async fn from_server(params: ConnectionParams) -> AgentResult<Self> {
        Self::from_server_filtered(params, None).await
    }

    /// Like [`McpToolset::from_server`], exposing only the named tools
    pub async fn from_server_filtered(
        params: ConnectionParams,
        tool_filter: Option<Vec<String>>,
    ) -> AgentResult<Self> {
        let transport: Arc<dyn McpTransport> = match &params {
            ConnectionParams::Stdio(p) => {
                Arc::new(StdioTransport::spawn(&p.command, &p.args, &p.env).await?)
            }
            ConnectionParams::Sse(p) => Arc::new(SseTransport::connect(p).await?),
        };

        Self::from_transport(transport, tool_filter).await
    }

    /// Build a toolset over an already-open transport
    pub async fn from_transport(
        transport: Arc<dyn McpTransport>,
        tool_filter: Option<Vec<String>>,
    ) -> AgentResult<Self> {
        let client = Arc::new(McpClient::new(transport));

        if let Err(e) = client.initialize().await {
            let _ = client.close().await;
            return Err(e.into());
        }

        let toolset = Self {
            client,
            tool_filter,
            tools: RwLock::new(Vec::new()),
        };

        if let Err(e) = toolset.fetch_tools().await {
            let _ = toolset.close().await;
            return Err(e);
        }

        if let Some(info) = toolset.client.server_info() {
            info!(
                "Connected to MCP server {} {} ({} tools)",
                info.name,
                info.version,
                toolset.len()
            );
        }

        Ok(toolset)
    }

    /// Re-list the server's tools and rebuild the adapters
    pub async fn fetch_tools(&self) -> AgentResult<Vec<Arc<dyn Tool>>> {
        let listed = self.client.list_tools().await?;

        let tools: Vec<Arc<dyn Tool>> = listed
            .into_iter()
            .filter(|tool| self.is_selected(&tool.name))
            .map(|tool| {
                Arc::new(McpToolAdapter::new(tool, Arc::clone(&self.client))) as Arc<dyn Tool>
            })
            .collect();

        if let Some(filter) = &self.tool_filter {
            for name in filter {
                if !tools.iter().any(|t| t.name() == name) {
                    warn!("Tool '{}' requested by filter is not offered by the server", name);
                }
            }
        }

        debug!(count = tools.len(), "Fetched MCP tools");
        *self.tools.write() = tools.clone();
        Ok(tools)
    }

    /// Tools discovered by the last fetch
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.read().clone()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    pub fn server_info(&self) -> Option<McpServerInfo> {
        self.client.server_info()
    }

    /// Underlying client
    pub fn client(&self) -> &Arc<McpClient> {
        &self.client
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Release the server connection. Calling it again is a no-op.
    pub async fn close(&self) -> AgentResult<()> {
        self.client.close().await?;
        Ok(())
    }

    fn is_selected(&self, name: &str) -> bool {
        match &self.tool_filter {
            Some(filter) => filter.iter().any(|n| n == name),
            None => true,
        }
    }
}

impl std::fmt::Debug for McpToolset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .tools
            .read()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        f.debug_struct("McpToolset").field("tools", &names).finish()
    }
}
