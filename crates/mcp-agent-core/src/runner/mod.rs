//! Agent runner
//!
//! [`Runner::run`] drives one invocation of an agent against a session and
//! streams the resulting events. The model is called in a loop: each reply
//! that requests function calls is followed by executing those tools and
//! feeding their results back, until the model answers without calling
//! anything.

use crate::agent::LlmAgent;
use crate::error::{AgentError, AgentResult};
use crate::events::Event;
use crate::llm::{Content, FunctionCall, Part, Role};
use crate::session::{Session, SessionService};
use futures::Stream;
use futures::future::try_join_all;
use serde_json::{Value, json};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Events of one invocation; ends after the final response or an error
pub type EventStream = Pin<Box<dyn Stream<Item = AgentResult<Event>> + Send>>;

/// Prefix of ids assigned to function calls the model left unnamed
pub const FUNCTION_CALL_ID_PREFIX: &str = "adk-";

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Runs an agent against sessions of one app
#[derive(Clone)]
pub struct Runner {
    app_name: String,
    agent: Arc<LlmAgent>,
    session_service: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: LlmAgent,
        session_service: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent: Arc::new(agent),
            session_service,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn agent(&self) -> &LlmAgent {
        &self.agent
    }

    pub fn session_service(&self) -> &Arc<dyn SessionService> {
        &self.session_service
    }

    /// Send `new_message` to the agent and stream what happens
    ///
    /// The user's message is recorded in the session but not yielded.
    /// The work runs on a background task; dropping the stream stops it at
    /// its next model call or event.
    pub fn run(
        &self,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        new_message: Content,
    ) -> EventStream {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let invocation = Invocation {
            id: format!("e-{}", Uuid::new_v4()),
            app_name: self.app_name.clone(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            agent: Arc::clone(&self.agent),
            session_service: Arc::clone(&self.session_service),
        };

        tokio::spawn(async move {
            if let Err(e) = invocation.run(new_message, &tx).await {
                warn!(invocation_id = %invocation.id, "Invocation failed: {}", e);
                let _ = tx.send(Err(e)).await;
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("app_name", &self.app_name)
            .field("agent", &self.agent.name())
            .finish()
    }
}

/// State of one `run` call
struct Invocation {
    id: String,
    app_name: String,
    user_id: String,
    session_id: String,
    agent: Arc<LlmAgent>,
    session_service: Arc<dyn SessionService>,
}

impl Invocation {
    #[instrument(skip_all, fields(invocation_id = %self.id, agent = %self.agent.name()))]
    async fn run(
        &self,
        new_message: Content,
        tx: &mpsc::Sender<AgentResult<Event>>,
    ) -> AgentResult<()> {
        let mut session = self.load_session().await?;

        let user_event = Event::new(&self.id, "user").with_content(new_message);
        self.session_service
            .append_event(&mut session, user_event)
            .await?;

        let max_calls = self.agent.max_llm_calls();
        let mut llm_calls = 0;

        loop {
            if llm_calls >= max_calls {
                return Err(AgentError::agent(format!(
                    "Exceeded the maximum of {} LLM calls in one invocation",
                    max_calls
                )));
            }
            llm_calls += 1;

            let request = self.agent.build_request(session.contents());
            debug!(
                call = llm_calls,
                contents = request.contents.len(),
                tools = request.tools.len(),
                "Calling model"
            );

            let response = tokio::select! {
                _ = tx.closed() => {
                    debug!("Event stream dropped, stopping invocation");
                    return Ok(());
                }
                response = self.agent.provider().generate(&request) => response?,
            };

            let mut event = Event::from_llm_response(&self.id, self.agent.name(), response);
            assign_function_call_ids(&mut event);

            let calls: Vec<FunctionCall> = event.function_calls().into_iter().cloned().collect();
            event.turn_complete = calls.is_empty();
            if let Some(code) = &event.error_code {
                warn!(
                    code = %code,
                    "Model returned no content: {}",
                    event.error_message.as_deref().unwrap_or_default()
                );
            }

            self.session_service
                .append_event(&mut session, event.clone())
                .await?;
            if tx.send(Ok(event)).await.is_err() {
                return Ok(());
            }

            if calls.is_empty() {
                info!(llm_calls, "Invocation complete");
                return Ok(());
            }

            let response_event = tokio::select! {
                _ = tx.closed() => {
                    debug!("Event stream dropped during tool execution");
                    return Ok(());
                }
                event = self.execute_function_calls(&calls) => event?,
            };

            self.session_service
                .append_event(&mut session, response_event.clone())
                .await?;
            if tx.send(Ok(response_event)).await.is_err() {
                return Ok(());
            }
        }
    }

    async fn load_session(&self) -> AgentResult<Session> {
        self.session_service
            .get_session(&self.app_name, &self.user_id, &self.session_id)
            .await?
            .ok_or_else(|| {
                AgentError::not_found(
                    "session",
                    format!(
                        "Session not found: {} (app {}, user {})",
                        self.session_id, self.app_name, self.user_id
                    ),
                )
            })
    }

    /// Run all calls concurrently; responses keep the order of the calls
    async fn execute_function_calls(&self, calls: &[FunctionCall]) -> AgentResult<Event> {
        let parts = try_join_all(calls.iter().map(|call| self.execute_function_call(call))).await?;
        Ok(Event::new(&self.id, self.agent.name()).with_content(Content::new(Role::User, parts)))
    }

    async fn execute_function_call(&self, call: &FunctionCall) -> AgentResult<Part> {
        let Some(tool) = self.agent.tools().get(&call.name) else {
            warn!(tool = %call.name, "Model called an unknown tool");
            let error = format!(
                "Tool '{}' not found. Available tools: {}",
                call.name,
                self.agent.tools().tool_names().join(", ")
            );
            return Ok(Part::function_response(
                call.id.clone(),
                &call.name,
                json!({ "error": error }),
            ));
        };

        let args = match &call.args {
            Value::Null => json!({}),
            args => args.clone(),
        };

        debug!(tool = %call.name, args = %args, "Executing tool");
        let response = tool
            .execute(args)
            .await
            .map_err(|e| e.with_context(format!("executing tool {}", call.name)))?;

        let response = match response {
            Value::Object(_) => response,
            other => json!({ "result": other }),
        };
        Ok(Part::function_response(call.id.clone(), &call.name, response))
    }
}

/// Give every function call in the event an id
fn assign_function_call_ids(event: &mut Event) {
    let Some(content) = event.content.as_mut() else {
        return;
    };
    for part in &mut content.parts {
        if let Part::FunctionCall(call) = part {
            if call.id.as_deref().is_none_or(str::is_empty) {
                call.id = Some(format!("{}{}", FUNCTION_CALL_ID_PREFIX, Uuid::new_v4()));
            }
        }
    }
}
