//! Error types for mcp-agent
//!
//! Every error type in the workspace implements [`UnifiedError`], which
//! gives the CLI a stable error code, a message, optional context and a
//! retryability hint regardless of which subsystem failed.

mod conversions;
mod types;

pub use types::{AgentError, AgentResult, UnifiedError};
