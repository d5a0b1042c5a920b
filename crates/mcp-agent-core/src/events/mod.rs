//! Agent events
//!
//! Everything that happens in a conversation is recorded as an [`Event`]:
//! the user's message, each model reply and each batch of tool results.
//! Sessions store them and the runner streams them to the caller.

use crate::llm::{Content, FunctionCall, FunctionResponse, LlmResponse, LlmUsage, Part};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One entry in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Groups the events produced by one `Runner::run`
    pub invocation_id: String,
    /// `user` or the name of the agent
    pub author: String,
    pub content: Option<Content>,
    /// Streaming chunk; never stored in a session
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub turn_complete: bool,
    pub finish_reason: Option<String>,
    pub usage: Option<LlmUsage>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(invocation_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: None,
            partial: false,
            turn_complete: false,
            finish_reason: None,
            usage: None,
            error_code: None,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Event carrying a model response
    pub fn from_llm_response(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        response: LlmResponse,
    ) -> Self {
        let mut event = Self::new(invocation_id, author);
        event.content = response.content;
        event.finish_reason = response.finish_reason;
        event.usage = response.usage;
        event.error_code = response.error_code;
        event.error_message = response.error_message;
        event
    }

    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content
            .as_ref()
            .map(Content::function_calls)
            .unwrap_or_default()
    }

    pub fn function_responses(&self) -> Vec<&FunctionResponse> {
        self.content
            .as_ref()
            .map(Content::function_responses)
            .unwrap_or_default()
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.content.as_ref().map(Content::text).unwrap_or_default()
    }

    /// Text of the first part, when that part is text
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(Part::as_text)
    }

    /// Whether this is the agent's answer for the turn
    ///
    /// True for any complete event that neither requests nor returns a
    /// function call, so a model error also ends the turn.
    pub fn is_final_response(&self) -> bool {
        !self.partial && self.function_calls().is_empty() && self.function_responses().is_empty()
    }

    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "author={} ", self.author)?;
        match (&self.content, &self.error_code) {
            (Some(content), _) => write!(f, "{}", content),
            (None, Some(code)) => write!(
                f,
                "error={} {}",
                code,
                self.error_message.as_deref().unwrap_or_default()
            ),
            (None, None) => write!(f, "<no content>"),
        }
    }
}
