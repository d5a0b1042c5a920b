//! mcp-agent core library
//!
//! This crate provides everything needed to put an LLM agent in front of
//! tools served by Model Context Protocol (MCP) servers: the MCP client and
//! its stdio/SSE transports, the Gemini provider, the agent definition, the
//! in-memory session service and the runner that streams agent events.

pub mod agent;
pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod mcp;
pub mod runner;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use agent::{LlmAgent, LlmAgentBuilder};
pub use config::{AppConfig, ModelParameters};
pub use error::{AgentError, AgentResult, UnifiedError};
pub use events::Event;
pub use llm::{Content, LlmProvider, Part, Role};
pub use mcp::{ConnectionParams, McpToolset, SseServerParams, StdioServerParameters};
pub use runner::{EventStream, Runner};
pub use session::{InMemorySessionService, Session, SessionService};
pub use tools::{Tool, ToolRegistry, ToolSchema};
