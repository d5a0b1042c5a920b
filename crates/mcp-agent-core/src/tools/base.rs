//! Core Tool trait definition

use super::types::ToolSchema;
use crate::error::AgentResult;
use async_trait::async_trait;
use serde_json::Value;

/// A capability the agent can invoke through a model function call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's unique name
    fn name(&self) -> &str;

    /// Get the tool's description for LLM understanding
    fn description(&self) -> &str;

    /// Function declaration sent to the model
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the model-supplied arguments
    ///
    /// The returned value becomes the `response` of the function response
    /// part the model sees next. Failures the model should read about are
    /// returned as `Ok` payloads; `Err` is reserved for failures that make
    /// continuing pointless (a dead server connection, for instance).
    async fn execute(&self, args: Value) -> AgentResult<Value>;
}
