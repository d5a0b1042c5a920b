//! Background message receiver for the MCP client

use super::super::error::McpError;
use super::super::protocol::{
    McpMessage, McpNotification, McpRequest, McpResponse, McpRpcError, RequestId, methods,
};
use super::super::transport::McpTransport;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub(super) type ResponseSender = oneshot::Sender<Result<McpResponse, McpError>>;

/// Requests awaiting a response, keyed by request id
pub(super) type PendingRequests = Arc<Mutex<HashMap<RequestId, ResponseSender>>>;

/// Receive messages until the transport fails or the client shuts down
pub(super) async fn message_receiver(
    transport: Arc<dyn McpTransport>,
    pending: PendingRequests,
    connected: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let reason = loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("MCP message receiver shutting down");
                break "MCP client closed".to_string();
            }
            result = transport.receive() => result,
        };

        match result {
            Ok(McpMessage::Response(response)) => route_response(&pending, response),
            Ok(McpMessage::Notification(notification)) => handle_notification(&notification),
            Ok(McpMessage::Request(request)) => {
                answer_server_request(transport.as_ref(), request).await
            }
            Err(e) => {
                if !cancel.is_cancelled() {
                    error!("Error receiving MCP message: {}", e);
                }
                break e.to_string();
            }
        }
    };

    connected.store(false, Ordering::SeqCst);
    fail_pending(&pending, &reason);
}

fn route_response(pending: &PendingRequests, response: McpResponse) {
    let sender = pending.lock().remove(&response.id);
    match sender {
        Some(sender) => {
            let id = response.id.clone();
            if sender.send(Ok(response)).is_err() {
                debug!("Request {} was abandoned before its response arrived", id);
            }
        }
        None => warn!("Received response for unknown request: {}", response.id),
    }
}

fn handle_notification(notification: &McpNotification) {
    match notification.method.as_str() {
        methods::TOOLS_LIST_CHANGED => info!("MCP server reported a changed tool list"),
        method => debug!("MCP notification: {} {:?}", method, notification.params),
    }
}

/// Server-initiated requests: only `ping` is supported
async fn answer_server_request(transport: &dyn McpTransport, request: McpRequest) {
    let response = match request.method.as_str() {
        methods::PING => McpResponse::success(request.id, json!({})),
        method => {
            warn!("Rejecting unsupported server request: {}", method);
            McpResponse::error(request.id, McpRpcError::method_not_found())
        }
    };

    if let Err(e) = transport.send(McpMessage::Response(response)).await {
        warn!("Failed to answer server request: {}", e);
    }
}

/// Complete every in-flight request with a connection error
pub(super) fn fail_pending(pending: &PendingRequests, reason: &str) {
    let drained: Vec<_> = pending.lock().drain().collect();
    for (id, sender) in drained {
        debug!("Failing pending request {}: {}", id, reason);
        let _ = sender.send(Err(McpError::connection(reason.to_string())));
    }
}
