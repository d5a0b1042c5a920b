//! LLM integration
//!
//! The conversation model ([`Content`], [`Part`]), the request/response
//! types, the [`LlmProvider`] trait and the Gemini implementation.

pub mod content;
pub mod converters;
pub mod google;
pub mod messages;
pub mod parser;
pub mod provider;

pub use content::{Content, FunctionCall, FunctionResponse, Part, Role};
pub use google::{DEFAULT_GOOGLE_BASE_URL, GoogleProvider};
pub use messages::{GenerationConfig, LlmRequest, LlmResponse, LlmUsage};
pub use provider::LlmProvider;

#[cfg(test)]
pub use provider::MockLlmProvider;
