//! Conversation sessions
//!
//! A session is identified by (app name, user id, session id) and holds the
//! ordered events of one conversation plus free-form state.

pub mod service;
pub mod types;

pub use service::{InMemorySessionService, SessionService};
pub use types::Session;
