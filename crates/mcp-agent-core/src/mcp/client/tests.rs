use super::*;
use crate::mcp::protocol::{McpResponse, McpRpcError};
use crate::mcp::transport::{McpTransport, StdioTransport};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::mpsc;

/// Client wired to an in-process calculator server over a duplex pipe.
/// Every message the server receives is forwarded to the returned channel.
fn connect_fake_server(
    request_timeout: Duration,
) -> (McpClient, mpsc::UnboundedReceiver<McpMessage>) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let transport = Arc::new(StdioTransport::from_io(client_read, client_write));

    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_fake_server(server_io, seen_tx, respond));

    (McpClient::with_timeout(transport, request_timeout), seen_rx)
}

type Responder = fn(McpRequest) -> Option<McpMessage>;

async fn run_fake_server(
    io: DuplexStream,
    seen: mpsc::UnboundedSender<McpMessage>,
    respond: Responder,
) {
    let (read, mut write) = tokio::io::split(io);
    let mut lines = BufReader::new(read).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let message: McpMessage = serde_json::from_str(&line).unwrap();
        let _ = seen.send(message.clone());

        let reply = match message {
            McpMessage::Request(request) => respond(request),
            // Ping the client back once the session is up
            McpMessage::Notification(n) if n.method == methods::INITIALIZED => Some(
                McpMessage::Request(McpRequest::new("srv-ping", methods::PING)),
            ),
            _ => None,
        };

        if let Some(reply) = reply {
            let mut out = serde_json::to_vec(&reply).unwrap();
            out.push(b'\n');
            if write.write_all(&out).await.is_err() {
                break;
            }
        }
    }
}

fn respond(request: McpRequest) -> Option<McpMessage> {
    let params = request.params.clone().unwrap_or(Value::Null);
    let id = request.id;

    let response = match request.method.as_str() {
        "initialize" => McpResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {"name": "calculator", "version": "1.0.0"},
                "instructions": "Use multiply for products."
            }),
        ),
        "tools/list" => match params.get("cursor").and_then(Value::as_str) {
            None => McpResponse::success(
                id,
                json!({
                    "tools": [{"name": "add", "inputSchema": {"type": "object"}}],
                    "nextCursor": "page-2"
                }),
            ),
            Some("page-2") => McpResponse::success(
                id,
                json!({"tools": [{"name": "multiply", "inputSchema": {"type": "object"}}]}),
            ),
            Some(_) => McpResponse::error(id, McpRpcError::new(-32602, "Invalid cursor")),
        },
        "tools/call" => match params["name"].as_str().unwrap_or_default() {
            "multiply" => {
                let a = params["arguments"]["a"].as_i64().unwrap_or_default();
                let b = params["arguments"]["b"].as_i64().unwrap_or_default();
                McpResponse::success(
                    id,
                    json!({"content": [{"type": "text", "text": (a * b).to_string()}]}),
                )
            }
            "slow" => return None,
            other => McpResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": format!("Unknown tool: {}", other)}],
                    "isError": true
                }),
            ),
        },
        "ping" => McpResponse::success(id, json!({})),
        _ => McpResponse::error(id, McpRpcError::method_not_found()),
    };

    Some(McpMessage::Response(response))
}

async fn next_matching<F>(seen: &mut mpsc::UnboundedReceiver<McpMessage>, mut pred: F) -> McpMessage
where
    F: FnMut(&McpMessage) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let message = seen.recv().await.unwrap();
            if pred(&message) {
                return message;
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_initialize_handshake() {
    let (client, mut seen) = connect_fake_server(Duration::from_secs(5));

    let info = client.initialize().await.unwrap();
    assert_eq!(info.name, "calculator");
    assert!(client.is_initialized());
    assert_eq!(client.server_info().unwrap().version, "1.0.0");
    assert_eq!(
        client.instructions().as_deref(),
        Some("Use multiply for products.")
    );
    assert!(client.capabilities().tools.is_some());

    let first = seen.recv().await.unwrap();
    match first {
        McpMessage::Request(req) => {
            assert_eq!(req.method, "initialize");
            let params = req.params.unwrap();
            assert_eq!(params["protocolVersion"], "2024-11-05");
            assert_eq!(params["clientInfo"]["name"], "mcp-agent");
        }
        other => panic!("expected initialize request, got {:?}", other),
    }
    assert!(matches!(
        seen.recv().await.unwrap(),
        McpMessage::Notification(n) if n.method == "notifications/initialized"
    ));

    assert!(matches!(
        client.initialize().await,
        Err(McpError::AlreadyInitialized)
    ));
}

#[tokio::test]
async fn test_operations_require_initialize() {
    let (client, _seen) = connect_fake_server(Duration::from_secs(5));

    assert!(matches!(
        client.list_tools().await,
        Err(McpError::NotInitialized)
    ));
    assert!(matches!(
        client.call_tool("multiply", json!({})).await,
        Err(McpError::NotInitialized)
    ));
    // ping is allowed before the handshake
    client.ping().await.unwrap();
}

#[tokio::test]
async fn test_list_tools_follows_cursor() {
    let (client, _seen) = connect_fake_server(Duration::from_secs(5));
    client.initialize().await.unwrap();

    let tools = client.list_tools().await.unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["add", "multiply"]);
    assert_eq!(client.cached_tools().len(), 2);
}

#[tokio::test]
async fn test_call_tool_results() {
    let (client, _seen) = connect_fake_server(Duration::from_secs(5));
    client.initialize().await.unwrap();

    let result = client
        .call_tool("multiply", json!({"a": 475, "b": 23}))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(result.text(), "10925");

    let result = client.call_tool("divide", json!({})).await.unwrap();
    assert!(result.is_error);
    assert_eq!(result.text(), "Unknown tool: divide");
}

#[tokio::test]
async fn test_concurrent_calls_are_routed_by_id() {
    let (client, _seen) = connect_fake_server(Duration::from_secs(5));
    client.initialize().await.unwrap();

    let (first, second) = tokio::join!(
        client.call_tool("multiply", json!({"a": 2, "b": 3})),
        client.call_tool("multiply", json!({"a": 7, "b": 11})),
    );

    assert_eq!(first.unwrap().text(), "6");
    assert_eq!(second.unwrap().text(), "77");
}

#[tokio::test]
async fn test_server_ping_is_answered() {
    let (client, mut seen) = connect_fake_server(Duration::from_secs(5));
    client.initialize().await.unwrap();

    let answer = next_matching(&mut seen, |m| {
        matches!(m, McpMessage::Response(r) if r.id == RequestId::from("srv-ping"))
    })
    .await;

    match answer {
        McpMessage::Response(response) => {
            assert!(response.is_success());
            assert_eq!(response.result, Some(json!({})));
        }
        other => panic!("expected response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_timeout_sends_cancellation() {
    let (client, mut seen) = connect_fake_server(Duration::from_millis(200));
    client.initialize().await.unwrap();

    let err = client.call_tool("slow", json!({})).await.unwrap_err();
    assert!(matches!(err, McpError::Timeout { .. }));

    let cancelled = next_matching(&mut seen, |m| {
        matches!(m, McpMessage::Notification(n) if n.method == "notifications/cancelled")
    })
    .await;
    if let McpMessage::Notification(n) = cancelled {
        assert!(n.params.unwrap()["requestId"].is_number());
    }
}

#[tokio::test]
async fn test_json_rpc_error_maps_to_server_error() {
    let (client, _seen) = connect_fake_server(Duration::from_secs(5));
    client.initialize().await.unwrap();

    let err = client
        .call::<Value>("resources/list", None)
        .await
        .unwrap_err();
    match err {
        McpError::Server { code, context, .. } => {
            assert_eq!(code, -32601);
            assert_eq!(context.as_deref(), Some("resources/list"));
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pending_request_fails_when_server_hangs_up() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let (client_read, client_write) = tokio::io::split(client_io);
    let transport = Arc::new(StdioTransport::from_io(client_read, client_write));

    // Read one request, then hang up without answering
    tokio::spawn(async move {
        let mut lines = BufReader::new(server_io).lines();
        let _ = lines.next_line().await;
    });

    let client = McpClient::new(transport);
    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, McpError::Connection { .. }));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (client, _seen) = connect_fake_server(Duration::from_secs(5));
    client.initialize().await.unwrap();

    client.close().await.unwrap();
    client.close().await.unwrap();

    assert!(!client.is_connected());
    assert!(!client.is_initialized());
    assert!(matches!(
        client.ping().await,
        Err(McpError::Connection { .. })
    ));
}

/// Pages through `a` then `b` and points back at `a`
fn respond_with_cursor_cycle(request: McpRequest) -> Option<McpMessage> {
    if request.method != "tools/list" {
        return respond(request);
    }

    let cursor = request
        .params
        .as_ref()
        .and_then(|p| p.get("cursor"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let (tool, next) = match cursor.as_deref() {
        None => ("add", "a"),
        Some("a") => ("subtract", "b"),
        _ => ("multiply", "a"),
    };

    Some(McpMessage::Response(McpResponse::success(
        request.id,
        json!({
            "tools": [{"name": tool, "inputSchema": {"type": "object"}}],
            "nextCursor": next
        }),
    )))
}

#[tokio::test]
async fn test_list_tools_stops_on_cursor_cycle() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let transport = Arc::new(StdioTransport::from_io(client_read, client_write));
    let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_fake_server(server_io, seen_tx, respond_with_cursor_cycle));

    let client = McpClient::with_timeout(transport, Duration::from_secs(5));
    client.initialize().await.unwrap();

    let tools = tokio::time::timeout(Duration::from_secs(2), client.list_tools())
        .await
        .expect("pagination did not terminate")
        .unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["add", "subtract", "multiply"]);
}

/// Passes requests through but cannot deliver notifications
struct DroppingNotifications(StdioTransport);

#[async_trait]
impl McpTransport for DroppingNotifications {
    async fn send(&self, message: McpMessage) -> Result<(), McpError> {
        match message {
            McpMessage::Notification(_) => Err(McpError::transport("Broken pipe")),
            other => self.0.send(other).await,
        }
    }

    async fn receive(&self) -> Result<McpMessage, McpError> {
        self.0.receive().await
    }

    async fn close(&self) -> Result<(), McpError> {
        self.0.close().await
    }

    fn is_connected(&self) -> bool {
        self.0.is_connected()
    }
}

#[tokio::test]
async fn test_failed_initialized_notification_leaves_client_uninitialized() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let transport = Arc::new(DroppingNotifications(StdioTransport::from_io(
        client_read,
        client_write,
    )));
    let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_fake_server(server_io, seen_tx, respond));

    let client = McpClient::with_timeout(transport, Duration::from_secs(5));
    let err = client.initialize().await.unwrap_err();

    assert!(matches!(err, McpError::Transport { .. }));
    assert!(!client.is_initialized());
    assert!(matches!(
        client.list_tools().await,
        Err(McpError::NotInitialized)
    ));
}
