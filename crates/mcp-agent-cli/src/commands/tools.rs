//! Tools command implementation

use crate::console::CliConsole;
use anyhow::{Context, Result};
use mcp_agent_core::ConnectionParams;
use mcp_agent_core::mcp::McpToolset;

/// Connect to a server and print the tools it offers
pub async fn list_tools(params: ConnectionParams, console: &CliConsole) -> Result<()> {
    let server = params.to_string();
    console.step(&format!(
        "Attempting to connect to MCP {} server...",
        params.transport_label()
    ));

    let toolset = McpToolset::from_server(params)
        .await
        .with_context(|| format!("Failed to connect to MCP server {}", server))?;

    let title = match toolset.server_info() {
        Some(info) if !info.version.is_empty() => format!("Tools on {} {}", info.name, info.version),
        Some(info) => format!("Tools on {}", info.name),
        None => format!("Tools on {}", server),
    };
    console.print_header(&title);

    // The client caches the raw MCP definitions from the last listing
    let tools = toolset.client().cached_tools();
    for tool in &tools {
        console.print_tool(tool);
    }
    println!();
    console.step(&format!("Total tools available: {}", tools.len()));

    toolset.close().await?;
    Ok(())
}
