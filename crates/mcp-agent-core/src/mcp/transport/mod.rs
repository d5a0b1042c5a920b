//! MCP transport layer implementations
//!
//! ## Available Transports
//!
//! - **Stdio**: newline-delimited JSON over a child process's stdin/stdout
//! - **SSE**: the HTTP+SSE transport, server events on a long-lived GET
//!   stream and client messages POSTed to the announced endpoint
//!
//! Transports take `&self` and lock their read and write halves
//! separately, so the client's background receiver can sit in `receive`
//! while requests are being sent.

pub mod sse;
pub mod stdio;

pub use sse::{SseDecoder, SseEvent, SseTransport};
pub use stdio::StdioTransport;

use super::error::McpError;
use super::protocol::McpMessage;
use async_trait::async_trait;

/// Transport trait for MCP communication
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Send a message
    async fn send(&self, message: McpMessage) -> Result<(), McpError>;

    /// Receive the next message
    async fn receive(&self) -> Result<McpMessage, McpError>;

    /// Close the transport
    async fn close(&self) -> Result<(), McpError>;

    /// Check if the transport is connected
    fn is_connected(&self) -> bool;
}
