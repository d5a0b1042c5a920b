//! Core error types and traits

use thiserror::Error;

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Unified error trait that all mcp-agent errors implement.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Main error type for mcp-agent
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// LLM client errors
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        context: Option<String>,
    },

    /// MCP protocol or transport errors
    #[error("MCP error: {message}")]
    Mcp {
        message: String,
        code: String,
        retryable: bool,
        context: Option<String>,
    },

    /// Tool execution errors
    #[error("Tool error: {tool_name}: {message}")]
    Tool {
        tool_name: String,
        message: String,
        context: Option<String>,
    },

    /// Agent execution errors
    #[error("Agent error: {message}")]
    Agent {
        message: String,
        context: Option<String>,
    },

    /// Session errors
    #[error("Session error: {message}")]
    Session {
        message: String,
        context: Option<String>,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource_type: Option<String>,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// HTTP request errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
        context: Option<String>,
    },

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,
}

impl AgentError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            provider: None,
            context: None,
        }
    }

    /// Create an LLM error tagged with the provider that raised it
    pub fn llm_with_provider(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            provider: Some(provider.into()),
            context: None,
        }
    }

    /// Create a new tool error
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Create a new agent error
    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
            context: None,
        }
    }

    /// Create a not-found error for a given resource type
    pub fn not_found(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: Some(resource_type.into()),
            context: None,
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            context: None,
        }
    }

    /// Create an IO error for a specific path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            context: None,
        }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            url: None,
            status_code: None,
            context: None,
        }
    }

    /// Attach context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Config { context: c, .. }
            | Self::Llm { context: c, .. }
            | Self::Mcp { context: c, .. }
            | Self::Tool { context: c, .. }
            | Self::Agent { context: c, .. }
            | Self::Session { context: c, .. }
            | Self::NotFound { context: c, .. }
            | Self::Io { context: c, .. }
            | Self::Json { context: c, .. }
            | Self::Http { context: c, .. } => *c = ctx,
            Self::Cancelled => {}
        }
        self
    }
}

impl UnifiedError for AgentError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "CONFIG",
            Self::Llm { .. } => "LLM",
            Self::Mcp { code, .. } => code.as_str(),
            Self::Tool { .. } => "TOOL",
            Self::Agent { .. } => "AGENT",
            Self::Session { .. } => "SESSION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Io { .. } => "IO",
            Self::Json { .. } => "JSON",
            Self::Http { .. } => "HTTP",
            Self::Cancelled => "CANCELLED",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. }
            | Self::Llm { message, .. }
            | Self::Mcp { message, .. }
            | Self::Tool { message, .. }
            | Self::Agent { message, .. }
            | Self::Session { message, .. }
            | Self::NotFound { message, .. }
            | Self::Io { message, .. }
            | Self::Json { message, .. }
            | Self::Http { message, .. } => message.as_str(),
            Self::Cancelled => "Operation was cancelled",
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. }
            | Self::Llm { context, .. }
            | Self::Mcp { context, .. }
            | Self::Tool { context, .. }
            | Self::Agent { context, .. }
            | Self::Session { context, .. }
            | Self::NotFound { context, .. }
            | Self::Io { context, .. }
            | Self::Json { context, .. }
            | Self::Http { context, .. } => context.as_deref(),
            Self::Cancelled => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Mcp { retryable, .. } => *retryable,
            Self::Http { status_code, .. } => {
                matches!(status_code, Some(429) | Some(500..=599) | None)
            }
            _ => false,
        }
    }
}
