//! Session service trait and in-memory implementation

use super::types::Session;
use crate::error::{AgentError, AgentResult};
use crate::events::Event;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Storage for sessions and their events
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a session; a generated UUID is used when `session_id` is `None`
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        state: Option<HashMap<String, Value>>,
        session_id: Option<String>,
    ) -> AgentResult<Session>;

    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> AgentResult<Option<Session>>;

    /// Sessions of one user, without their events
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> AgentResult<Vec<Session>>;

    async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> AgentResult<()>;

    /// Record an event in storage and in the caller's copy of the session
    ///
    /// Partial events are ignored.
    async fn append_event(&self, session: &mut Session, event: Event) -> AgentResult<()>;
}

type SessionsByUser = HashMap<String, HashMap<String, Session>>;

/// Session service holding everything in process memory
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    /// app name -> user id -> session id -> session
    sessions: RwLock<HashMap<String, SessionsByUser>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        state: Option<HashMap<String, Value>>,
        session_id: Option<String>,
    ) -> AgentResult<Session> {
        let id = session_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut sessions = self.sessions.write();
        let user_sessions = sessions
            .entry(app_name.to_string())
            .or_default()
            .entry(user_id.to_string())
            .or_default();

        if user_sessions.contains_key(&id) {
            return Err(AgentError::session(format!("Session with id {} already exists", id)));
        }

        let session = Session::new(&id, app_name, user_id, state.unwrap_or_default());
        user_sessions.insert(id.clone(), session.clone());

        debug!(app_name, user_id, session_id = %id, "Created session");
        Ok(session)
    }

    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> AgentResult<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .get(app_name)
            .and_then(|users| users.get(user_id))
            .and_then(|sessions| sessions.get(session_id))
            .cloned())
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> AgentResult<Vec<Session>> {
        let sessions = self.sessions.read();
        let mut listed: Vec<Session> = sessions
            .get(app_name)
            .and_then(|users| users.get(user_id))
            .map(|sessions| sessions.values().map(Session::summary).collect())
            .unwrap_or_default();

        listed.sort_by(|a, b| a.last_update_time.cmp(&b.last_update_time));
        Ok(listed)
    }

    async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> AgentResult<()> {
        let removed = self
            .sessions
            .write()
            .get_mut(app_name)
            .and_then(|users| users.get_mut(user_id))
            .and_then(|sessions| sessions.remove(session_id));

        if removed.is_none() {
            debug!(app_name, user_id, session_id, "Deleting unknown session");
        }
        Ok(())
    }

    async fn append_event(&self, session: &mut Session, event: Event) -> AgentResult<()> {
        if event.partial {
            return Ok(());
        }

        let mut sessions = self.sessions.write();
        let stored = sessions
            .get_mut(&session.app_name)
            .and_then(|users| users.get_mut(&session.user_id))
            .and_then(|sessions| sessions.get_mut(&session.id))
            .ok_or_else(|| {
                AgentError::not_found("session", format!("Session not found: {}", session.id))
            })?;

        let now = Utc::now();
        stored.events.push(event.clone());
        stored.last_update_time = now;

        session.events.push(event);
        session.last_update_time = now;
        Ok(())
    }
}
