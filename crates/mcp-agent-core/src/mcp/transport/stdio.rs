//! Standard I/O transport for MCP
//!
//! Spawns the server as a subprocess and exchanges newline-delimited JSON
//! over its stdin/stdout. The server's stderr is inherited so its logs stay
//! visible.

use super::McpTransport;
use crate::mcp::error::McpError;
use crate::mcp::protocol::McpMessage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// How long `close` waits for the server to exit after stdin is closed
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Stdio transport for MCP communication
pub struct StdioTransport {
    /// Child process, absent when built from raw streams
    child: parking_lot::Mutex<Option<Child>>,
    writer: Mutex<Option<BoxedWriter>>,
    reader: Mutex<BufReader<BoxedReader>>,
    connected: AtomicBool,
}

impl StdioTransport {
    /// Spawn a new MCP server process
    #[instrument(skip(args, env), level = "debug")]
    pub async fn spawn(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self, McpError> {
        let mut cmd = Command::new(command);

        cmd.args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            McpError::connection(format!("Failed to spawn MCP server '{}': {}", command, e))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::connection("Failed to get stdin handle"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::connection("Failed to get stdout handle"))?;

        debug!(pid = ?child.id(), "Spawned MCP server '{}'", command);

        let transport = Self::from_io(stdout, stdin);
        *transport.child.lock() = Some(child);
        Ok(transport)
    }

    /// Build a transport over arbitrary byte streams (in-process servers, tests)
    pub fn from_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            child: parking_lot::Mutex::new(None),
            writer: Mutex::new(Some(Box::new(writer))),
            reader: Mutex::new(BufReader::new(Box::new(reader))),
            connected: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn send(&self, message: McpMessage) -> Result<(), McpError> {
        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| McpError::connection("Transport closed"))?;

        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');

        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn receive(&self) -> Result<McpMessage, McpError> {
        let mut reader = self.reader.lock().await;
        let mut line = Vec::new();

        loop {
            line.clear();
            let bytes_read = reader.read_until(b'\n', &mut line).await?;

            if bytes_read == 0 {
                self.connected.store(false, Ordering::SeqCst);
                return Err(McpError::connection("Connection closed"));
            }

            let text = match std::str::from_utf8(&line) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Skipping non-UTF-8 line from MCP server: {} ({})",
                        String::from_utf8_lossy(&line).trim(),
                        e
                    );
                    continue;
                }
            };

            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<McpMessage>(trimmed) {
                Ok(message) => return Ok(message),
                // Servers occasionally print banners on stdout
                Err(e) => warn!("Skipping non-JSON-RPC line from MCP server: {} ({})", trimmed, e),
            }
        }
    }

    async fn close(&self) -> Result<(), McpError> {
        self.connected.store(false, Ordering::SeqCst);

        // Dropping stdin signals EOF to the server
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        let child = self.child.lock().take();
        if let Some(mut child) = child {
            match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
                Ok(result) => {
                    let status = result.map_err(|e| McpError::transport(e.to_string()))?;
                    debug!("MCP server exited with {}", status);
                }
                Err(_) => {
                    warn!("MCP server did not exit within {:?}, killing it", SHUTDOWN_GRACE);
                    child.kill().await.ok();
                }
            }
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.get_mut().take() {
            let _ = child.start_kill();
        }
    }
}
