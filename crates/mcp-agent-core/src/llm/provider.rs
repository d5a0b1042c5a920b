//! LLM provider trait

use super::messages::{LlmRequest, LlmResponse};
use crate::error::AgentResult;
use async_trait::async_trait;

/// A backend that turns a conversation into the model's next message
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs and errors
    fn name(&self) -> &'static str;

    /// Run one non-streaming generation
    async fn generate(&self, request: &LlmRequest) -> AgentResult<LlmResponse>;
}
