//! HTTP+SSE transport for MCP
//!
//! The client opens a long-lived `GET` with `Accept: text/event-stream`.
//! The server first announces, in an `endpoint` event, the URL that client
//! messages must be POSTed to; every later `message` event carries one
//! JSON-RPC message from the server.

mod decoder;

pub use decoder::{SseDecoder, SseEvent};

use super::McpTransport;
use crate::mcp::connection::SseServerParams;
use crate::mcp::error::McpError;
use crate::mcp::protocol::McpMessage;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// SSE transport for MCP
pub struct SseTransport {
    client: Client,
    /// POST target announced by the server
    endpoint: Url,
    incoming: Mutex<mpsc::Receiver<McpMessage>>,
    connected: Arc<AtomicBool>,
    cancel: CancellationToken,
    reader: parking_lot::Mutex<Option<JoinHandle<()>>>,
    request_timeout: Duration,
}

impl SseTransport {
    /// Open the event stream and wait for the server's `endpoint` event
    #[instrument(skip(params), fields(url = %params.url), level = "debug")]
    pub async fn connect(params: &SseServerParams) -> Result<Self, McpError> {
        let base = Url::parse(&params.url).map_err(|e| {
            McpError::connection(format!("Invalid SSE URL '{}': {}", params.url, e))
        })?;
        let client = build_client(params)?;

        let response = tokio::time::timeout(
            params.timeout,
            client
                .get(base.clone())
                .header(ACCEPT, "text/event-stream")
                .send(),
        )
        .await
        .map_err(|_| McpError::timeout(params.timeout.as_secs()).with_context("SSE connect"))?
        .map_err(|e| McpError::connection(format!("Failed to connect to {}: {}", base, e)))?;

        if !response.status().is_success() {
            return Err(McpError::connection(format!(
                "SSE connection failed with status: {}",
                response.status()
            )));
        }

        let (endpoint_tx, endpoint_rx) = oneshot::channel();
        let (message_tx, message_rx) = mpsc::channel(100);
        let connected = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(read_events(
            response,
            base,
            params.sse_read_timeout,
            endpoint_tx,
            message_tx,
            Arc::clone(&connected),
            cancel.clone(),
        ));

        let endpoint = match tokio::time::timeout(params.timeout, endpoint_rx).await {
            Ok(Ok(Ok(endpoint))) => endpoint,
            Ok(Ok(Err(e))) => {
                cancel.cancel();
                handle.abort();
                return Err(e);
            }
            Ok(Err(_)) => {
                return Err(McpError::connection(
                    "SSE stream closed before the endpoint event",
                ));
            }
            Err(_) => {
                cancel.cancel();
                handle.abort();
                return Err(McpError::timeout(params.timeout.as_secs())
                    .with_context("waiting for SSE endpoint event"));
            }
        };

        debug!("MCP SSE endpoint: {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            incoming: Mutex::new(message_rx),
            connected,
            cancel,
            reader: parking_lot::Mutex::new(Some(handle)),
            request_timeout: params.timeout,
        })
    }

    /// URL client messages are POSTed to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn build_client(params: &SseServerParams) -> Result<Client, McpError> {
    let mut headers = HeaderMap::new();
    for (key, value) in &params.headers {
        match (
            HeaderName::try_from(key.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Skipping invalid HTTP header '{}'", key),
        }
    }

    // No overall timeout: the event stream stays open for the whole session
    Client::builder()
        .default_headers(headers)
        .connect_timeout(params.timeout)
        .build()
        .map_err(|e| McpError::connection(format!("Failed to create HTTP client: {}", e)))
}

/// Reader task: decode events until the stream ends, stalls or is cancelled
async fn read_events(
    response: Response,
    base: Url,
    read_timeout: Duration,
    endpoint_tx: oneshot::Sender<Result<Url, McpError>>,
    message_tx: mpsc::Sender<McpMessage>,
    connected: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut endpoint_tx = Some(endpoint_tx);

    'read: loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = tokio::time::timeout(read_timeout, stream.next()) => next,
        };

        let bytes = match next {
            Ok(Some(Ok(bytes))) => bytes,
            Ok(Some(Err(e))) => {
                error!("SSE stream error: {}", e);
                break;
            }
            Ok(None) => {
                debug!("SSE stream ended");
                break;
            }
            Err(_) => {
                warn!("No SSE data within {:?}, closing stream", read_timeout);
                break;
            }
        };

        for event in decoder.feed(&bytes) {
            match event.event_type.as_deref() {
                Some("endpoint") => match endpoint_tx.take() {
                    Some(tx) => {
                        let _ = tx.send(resolve_endpoint(&base, &event.data));
                    }
                    None => debug!("Ignoring repeated endpoint event"),
                },
                None | Some("message") => {
                    if let Some(message) = decode_message(&event) {
                        if message_tx.send(message).await.is_err() {
                            break 'read;
                        }
                    }
                }
                Some(other) => debug!("Ignoring SSE event of type '{}'", other),
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
}

/// Resolve the announced endpoint against the SSE URL
pub(crate) fn resolve_endpoint(base: &Url, data: &str) -> Result<Url, McpError> {
    base.join(data.trim()).map_err(|e| {
        McpError::protocol(format!("Invalid endpoint '{}' announced by server: {}", data, e))
    })
}

pub(crate) fn decode_message(event: &SseEvent) -> Option<McpMessage> {
    match serde_json::from_str::<McpMessage>(&event.data) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Skipping unparseable SSE message: {} ({})", event.data, e);
            None
        }
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn send(&self, message: McpMessage) -> Result<(), McpError> {
        if !self.is_connected() {
            return Err(McpError::connection("Transport closed"));
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&message)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| McpError::transport(format!("Failed to POST message: {}", e)))?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
        ) {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(McpError::server(i32::from(status.as_u16()), body))
    }

    async fn receive(&self) -> Result<McpMessage, McpError> {
        let mut incoming = self.incoming.lock().await;
        incoming
            .recv()
            .await
            .ok_or_else(|| McpError::connection("SSE stream closed"))
    }

    async fn close(&self) -> Result<(), McpError> {
        self.connected.store(false, Ordering::SeqCst);
        self.cancel.cancel();
        if let Some(handle) = self.reader.lock().take() {
            handle.abort();
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
