//! MCP error types

use crate::error::UnifiedError;
use thiserror::Error;

/// MCP-specific errors
#[derive(Debug, Error, Clone)]
pub enum McpError {
    /// Connection error
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        context: Option<String>,
    },

    /// Protocol error
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        context: Option<String>,
    },

    /// Transport error
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        context: Option<String>,
    },

    /// Server error with code
    #[error("Server error {code}: {message}")]
    Server {
        code: i32,
        message: String,
        context: Option<String>,
    },

    /// Timeout
    #[error("Request timeout after {seconds} seconds")]
    Timeout {
        seconds: u64,
        context: Option<String>,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        context: Option<String>,
    },

    /// Not initialized
    #[error("Client not initialized")]
    NotInitialized,

    /// Already initialized
    #[error("Client already initialized")]
    AlreadyInitialized,
}

impl McpError {
    /// Create a new Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Server error
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Timeout error
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout {
            seconds,
            context: None,
        }
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to any MCP error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Connection { context: c, .. }
            | Self::Protocol { context: c, .. }
            | Self::Transport { context: c, .. }
            | Self::Server { context: c, .. }
            | Self::Timeout { context: c, .. }
            | Self::Serialization { context: c, .. } => *c = ctx,
            Self::NotInitialized | Self::AlreadyInitialized => {}
        }
        self
    }
}

impl UnifiedError for McpError {
    fn error_code(&self) -> &str {
        match self {
            Self::Connection { .. } => "MCP_CONNECTION",
            Self::Protocol { .. } => "MCP_PROTOCOL",
            Self::Transport { .. } => "MCP_TRANSPORT",
            Self::Server { .. } => "MCP_SERVER",
            Self::Timeout { .. } => "MCP_TIMEOUT",
            Self::Serialization { .. } => "MCP_SERIALIZATION",
            Self::NotInitialized => "MCP_NOT_INITIALIZED",
            Self::AlreadyInitialized => "MCP_ALREADY_INITIALIZED",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Connection { message, .. }
            | Self::Protocol { message, .. }
            | Self::Transport { message, .. }
            | Self::Server { message, .. }
            | Self::Serialization { message, .. } => message.as_str(),
            Self::Timeout { .. } => "Request timeout",
            Self::NotInitialized => "Client not initialized",
            Self::AlreadyInitialized => "Client already initialized",
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Connection { context, .. }
            | Self::Protocol { context, .. }
            | Self::Transport { context, .. }
            | Self::Server { context, .. }
            | Self::Timeout { context, .. }
            | Self::Serialization { context, .. } => context.as_deref(),
            Self::NotInitialized | Self::AlreadyInitialized => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Transport { .. } | Self::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        Self::transport(err.to_string())
    }
}
