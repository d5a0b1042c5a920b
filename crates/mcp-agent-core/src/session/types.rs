//! Session type definitions

use crate::events::Event;
use crate::llm::Content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A conversation between one user and one app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    /// Free-form key/value state
    #[serde(default)]
    pub state: HashMap<String, Value>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        state: HashMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            app_name: app_name.into(),
            user_id: user_id.into(),
            state,
            events: Vec::new(),
            last_update_time: Utc::now(),
        }
    }

    /// Conversation history as model contents
    pub fn contents(&self) -> Vec<Content> {
        self.events
            .iter()
            .filter_map(|event| event.content.clone())
            .filter(|content| !content.parts.is_empty())
            .collect()
    }

    /// Copy without the event history
    pub fn summary(&self) -> Self {
        Self {
            events: Vec::new(),
            ..self.clone()
        }
    }
}
