//! Agent tools
//!
//! Tools are what the model can call. Every tool advertises a
//! [`ToolSchema`] (a Gemini function declaration) and executes with the
//! JSON arguments the model supplied.

pub mod base;
pub mod mcp_tool;
pub mod registry;
pub mod schema;
pub mod types;

pub use base::Tool;
pub use mcp_tool::McpToolAdapter;
pub use registry::ToolRegistry;
pub use schema::to_gemini_schema;
pub use types::{ToolSchema, empty_object_schema};
