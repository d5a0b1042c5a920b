//! MCP client implementation
//!
//! A background receiver task owns the read side of the transport and
//! routes each response to the request waiting for it, so several requests
//! (parallel tool calls) can be in flight at once.

mod operations;
mod receiver;

use super::error::McpError;
use super::protocol::{McpMessage, McpNotification, McpRequest, RequestId, methods};
use super::transport::McpTransport;
use super::types::{
    ClientCapabilities, ClientInfo, InitializeParams, InitializeResult, McpCapabilities,
    McpServerInfo, McpTool,
};
use parking_lot::{Mutex, RwLock};
use receiver::PendingRequests;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// MCP client for communicating with MCP servers
pub struct McpClient {
    transport: Arc<dyn McpTransport>,
    pending: PendingRequests,
    server_info: RwLock<Option<McpServerInfo>>,
    capabilities: RwLock<McpCapabilities>,
    instructions: RwLock<Option<String>>,
    /// Tools from the last `list_tools`
    tools: RwLock<Vec<McpTool>>,
    request_id: AtomicI64,
    initialized: AtomicBool,
    /// Cleared by the receiver when the transport goes away
    connected: Arc<AtomicBool>,
    closed: AtomicBool,
    request_timeout: Duration,
    cancel: CancellationToken,
    receiver_handle: Mutex<Option<JoinHandle<()>>>,
}

impl McpClient {
    /// Create a new MCP client with the given transport
    pub fn new(transport: Arc<dyn McpTransport>) -> Self {
        Self::with_timeout(transport, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Create a new MCP client with custom timeout
    pub fn with_timeout(transport: Arc<dyn McpTransport>, request_timeout: Duration) -> Self {
        let pending: PendingRequests = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();

        let receiver_handle = tokio::spawn(receiver::message_receiver(
            Arc::clone(&transport),
            Arc::clone(&pending),
            Arc::clone(&connected),
            cancel.clone(),
        ));

        Self {
            transport,
            pending,
            server_info: RwLock::new(None),
            capabilities: RwLock::new(McpCapabilities::default()),
            instructions: RwLock::new(None),
            tools: RwLock::new(Vec::new()),
            request_id: AtomicI64::new(1),
            initialized: AtomicBool::new(false),
            connected,
            closed: AtomicBool::new(false),
            request_timeout,
            cancel,
            receiver_handle: Mutex::new(Some(receiver_handle)),
        }
    }

    /// Initialize the MCP connection
    #[instrument(skip(self), level = "debug")]
    pub async fn initialize(&self) -> Result<McpServerInfo, McpError> {
        if self.initialized.load(Ordering::SeqCst) {
            return Err(McpError::AlreadyInitialized);
        }

        let params = InitializeParams {
            protocol_version: super::protocol::MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: ClientInfo::default(),
        };

        let result: InitializeResult = self.call(methods::INITIALIZE, Some(json!(params))).await?;

        if result.protocol_version != super::protocol::MCP_PROTOCOL_VERSION {
            warn!(
                "MCP server negotiated protocol version {}",
                result.protocol_version
            );
        }

        *self.server_info.write() = Some(result.server_info.clone());
        *self.capabilities.write() = result.capabilities;
        *self.instructions.write() = result.instructions;

        self.notify(methods::INITIALIZED, None).await?;
        self.initialized.store(true, Ordering::SeqCst);

        debug!(
            "Initialized MCP session with {} {}",
            result.server_info.name, result.server_info.version
        );
        Ok(result.server_info)
    }

    /// Check if the client is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Get server info
    pub fn server_info(&self) -> Option<McpServerInfo> {
        self.server_info.read().clone()
    }

    /// Get server capabilities
    pub fn capabilities(&self) -> McpCapabilities {
        self.capabilities.read().clone()
    }

    /// Usage instructions the server sent during initialization
    pub fn instructions(&self) -> Option<String> {
        self.instructions.read().clone()
    }

    /// Check if the client is connected
    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.connected.load(Ordering::SeqCst)
    }

    /// Get cached tools
    pub fn cached_tools(&self) -> Vec<McpTool> {
        self.tools.read().clone()
    }

    /// Close the client connection. Calling it again is a no-op.
    pub async fn close(&self) -> Result<(), McpError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.cancel.cancel();
        let result = self.transport.close().await;

        let handle = self.receiver_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        self.initialized.store(false, Ordering::SeqCst);
        result
    }

    /// Make a request and wait for response with timeout
    pub(crate) async fn call<T>(&self, method: &str, params: Option<Value>) -> Result<T, McpError>
    where
        T: serde::de::DeserializeOwned,
    {
        if !self.is_connected() {
            return Err(McpError::connection("MCP client is not connected").with_context(method));
        }

        let id = self.next_request_id();
        let mut request = McpRequest::new(id.clone(), method);
        if let Some(p) = params {
            request = request.with_params(p);
        }

        // Registered before sending so a fast response cannot be missed
        let (response_sender, response_receiver) = oneshot::channel();
        self.pending.lock().insert(id.clone(), response_sender);

        if let Err(e) = self.transport.send(McpMessage::Request(request)).await {
            self.pending.lock().remove(&id);
            return Err(e.with_context(method));
        }

        let response = match timeout(self.request_timeout, response_receiver).await {
            Ok(Ok(response)) => response.map_err(|e| e.with_context(method))?,
            Ok(Err(_)) => {
                return Err(McpError::connection("Response channel closed").with_context(method));
            }
            Err(_) => {
                self.pending.lock().remove(&id);
                self.cancel_request(&id, "request timed out").await;
                return Err(McpError::timeout(self.request_timeout.as_secs()).with_context(method));
            }
        };

        match response.into_result() {
            Ok(value) => serde_json::from_value(value).map_err(McpError::from),
            Err(e) => Err(McpError::server(e.code, e.message).with_context(method)),
        }
    }

    /// Send a notification (no response expected)
    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        let mut notification = McpNotification::new(method);
        if let Some(p) = params {
            notification = notification.with_params(p);
        }
        self.transport
            .send(McpMessage::Notification(notification))
            .await
    }

    /// Tell the server an abandoned request can be dropped
    async fn cancel_request(&self, id: &RequestId, reason: &str) {
        let params = json!({ "requestId": id, "reason": reason });
        if let Err(e) = self.notify(methods::CANCELLED, Some(params)).await {
            debug!("Failed to send cancellation for request {}: {}", id, e);
        }
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.request_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), McpError> {
        if !self.is_initialized() {
            return Err(McpError::NotInitialized);
        }
        Ok(())
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.receiver_handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests;
