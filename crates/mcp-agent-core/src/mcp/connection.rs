//! MCP server connection parameters

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_sse_read_timeout() -> Duration {
    Duration::from_secs(300)
}

/// How to reach an MCP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum ConnectionParams {
    /// Launch the server as a subprocess and talk over its stdin/stdout
    Stdio(StdioServerParameters),
    /// Connect to a running server over HTTP+SSE
    Sse(SseServerParams),
}

impl ConnectionParams {
    /// Short label used in progress messages
    pub fn transport_label(&self) -> &'static str {
        match self {
            Self::Stdio(_) => "stdio",
            Self::Sse(_) => "SSE",
        }
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio(params) => {
                write!(f, "{}", params.command)?;
                for arg in &params.args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Self::Sse(params) => write!(f, "{}", params.url),
        }
    }
}

impl From<StdioServerParameters> for ConnectionParams {
    fn from(params: StdioServerParameters) -> Self {
        Self::Stdio(params)
    }
}

impl From<SseServerParams> for ConnectionParams {
    fn from(params: SseServerParams) -> Self {
        Self::Sse(params)
    }
}

/// Subprocess command line for a stdio server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdioServerParameters {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl StdioServerParameters {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Endpoint and timeouts for an HTTP+SSE server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SseServerParams {
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Connect, endpoint-discovery and POST timeout
    #[serde(
        rename = "timeout_secs",
        with = "duration_secs",
        default = "default_timeout"
    )]
    pub timeout: Duration,
    /// Longest silence tolerated on the event stream
    #[serde(
        rename = "sse_read_timeout_secs",
        with = "duration_secs",
        default = "default_sse_read_timeout"
    )]
    pub sse_read_timeout: Duration,
}

impl SseServerParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: default_timeout(),
            sse_read_timeout: default_sse_read_timeout(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sse_read_timeout(mut self, timeout: Duration) -> Self {
        self.sse_read_timeout = timeout;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stdio_from_config_json() {
        let params: ConnectionParams = serde_json::from_value(json!({
            "transport": "stdio",
            "command": "python",
            "args": ["-m", "mcp_server_calculator"]
        }))
        .unwrap();

        assert_eq!(
            params,
            ConnectionParams::Stdio(
                StdioServerParameters::new("python").with_args(["-m", "mcp_server_calculator"])
            )
        );
        assert_eq!(params.to_string(), "python -m mcp_server_calculator");
        assert_eq!(params.transport_label(), "stdio");
    }

    #[test]
    fn test_sse_defaults() {
        let params: ConnectionParams = serde_json::from_value(json!({
            "transport": "sse",
            "url": "http://localhost:8000/sse"
        }))
        .unwrap();

        match params {
            ConnectionParams::Sse(sse) => {
                assert_eq!(sse.timeout, Duration::from_secs(5));
                assert_eq!(sse.sse_read_timeout, Duration::from_secs(300));
                assert!(sse.headers.is_empty());
            }
            other => panic!("expected SSE params, got {:?}", other),
        }
    }

    #[test]
    fn test_sse_timeouts_in_seconds() {
        let params: SseServerParams = serde_json::from_value(json!({
            "url": "http://localhost:8000/sse",
            "headers": {"Authorization": "Bearer t"},
            "timeout_secs": 2.5,
            "sse_read_timeout_secs": 60
        }))
        .unwrap();

        assert_eq!(params.timeout, Duration::from_millis(2500));
        assert_eq!(params.sse_read_timeout, Duration::from_secs(60));

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["timeout_secs"], 2.5);
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let result: Result<ConnectionParams, _> =
            serde_json::from_value(json!({"transport": "websocket", "url": "ws://x"}));
        assert!(result.is_err());
    }
}
