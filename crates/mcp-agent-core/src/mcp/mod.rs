//! Model Context Protocol (MCP) support
//!
//! Client side of MCP: JSON-RPC message types, the stdio and HTTP+SSE
//! transports, a request/response client and the toolset that turns a
//! server's tools into agent tools.

pub mod client;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod toolset;
pub mod transport;
pub mod types;

pub use client::McpClient;
pub use connection::{ConnectionParams, SseServerParams, StdioServerParameters};
pub use error::McpError;
pub use protocol::{McpMessage, McpNotification, McpRequest, McpResponse, McpRpcError, RequestId};
pub use toolset::McpToolset;
pub use transport::{McpTransport, SseTransport, StdioTransport};
pub use types::{McpContent, McpServerInfo, McpTool, McpToolResult};
