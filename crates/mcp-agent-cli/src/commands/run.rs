//! Agent run command
//!
//! Connect to one MCP server, hand its tools to a Gemini agent, ask one
//! question, stream the events until the final answer and close the
//! connection again, whatever happened in between.

use crate::args::RunArgs;
use crate::console::CliConsole;
use crate::signal_handler::SignalHandler;
use anyhow::{Context, Result};
use futures::StreamExt;
use mcp_agent_core::{
    AppConfig, ConnectionParams, Content, InMemorySessionService, LlmAgent, LlmProvider,
    McpToolset, Runner, SessionService,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Defaults for one flavour of run
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub app_name: &'static str,
    pub instruction: &'static str,
    pub query: &'static str,
    /// Re-list tools after connecting and report it
    pub fetch_tools: bool,
}

pub const STDIO_PRESET: Preset = Preset {
    app_name: "Math_assistant",
    instruction: "Help user with Math operations.",
    query: "How much is 475 * 23?",
    fetch_tools: false,
};

pub const SSE_PRESET: Preset = Preset {
    app_name: "tavily_search",
    instruction: "Help user research information over internet.",
    query: "whats Miraidon?",
    fetch_tools: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Stopped by Ctrl+C
    Interrupted,
}

/// Preset values with command-line overrides applied
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub app_name: String,
    pub instruction: String,
    pub query: String,
    pub user_id: String,
    pub fetch_tools: bool,
}

impl AgentSettings {
    pub fn resolve(preset: &Preset, args: &RunArgs) -> Self {
        Self {
            app_name: args
                .agent_name
                .clone()
                .unwrap_or_else(|| preset.app_name.to_string()),
            instruction: args
                .instruction
                .clone()
                .unwrap_or_else(|| preset.instruction.to_string()),
            query: args.query.clone().unwrap_or_else(|| preset.query.to_string()),
            user_id: args.user_id.clone(),
            fetch_tools: preset.fetch_tools,
        }
    }
}

/// Run one query against the given server
pub async fn run_agent(
    params: ConnectionParams,
    preset: &Preset,
    args: &RunArgs,
    config: &AppConfig,
    console: &CliConsole,
) -> Result<RunOutcome> {
    let settings = AgentSettings::resolve(preset, args);

    // Fail on a missing key before anything is spawned
    let provider: Arc<dyn LlmProvider> = Arc::new(config.model.build_provider()?);
    debug!(
        model = %config.model.model,
        api_key = ?config.model.masked_api_key(),
        "Using Gemini"
    );

    let signals = SignalHandler::start().context("Failed to install the Ctrl+C handler")?;
    let outcome = connect_and_run(params, &settings, provider, config, &signals, console).await;
    signals.stop();
    outcome
}

async fn connect_and_run(
    params: ConnectionParams,
    settings: &AgentSettings,
    provider: Arc<dyn LlmProvider>,
    config: &AppConfig,
    signals: &SignalHandler,
    console: &CliConsole,
) -> Result<RunOutcome> {
    console.step(&format!(
        "Attempting to connect to MCP {} server...",
        params.transport_label()
    ));

    let server = params.to_string();
    let toolset = tokio::select! {
        _ = signals.interrupted() => {
            console.warn("Interrupted while connecting");
            return Ok(RunOutcome::Interrupted);
        }
        toolset = McpToolset::from_server(params) => {
            toolset.with_context(|| format!("Failed to connect to MCP server {}", server))?
        }
    };
    console.success("MCP Toolset created successfully.");

    let result = converse(&toolset, settings, provider, config, signals, console).await;

    console.step("Closing MCP server connection...");
    let closed = toolset.close().await;
    console.step("Cleanup complete.");

    let outcome = result?;
    closed.context("Failed to close the MCP connection")?;
    Ok(outcome)
}

#[instrument(skip_all, fields(app = %settings.app_name))]
async fn converse(
    toolset: &McpToolset,
    settings: &AgentSettings,
    provider: Arc<dyn LlmProvider>,
    config: &AppConfig,
    signals: &SignalHandler,
    console: &CliConsole,
) -> Result<RunOutcome> {
    let tools = if settings.fetch_tools {
        console.step("Fetching tools from MCP server...");
        let tools = toolset.fetch_tools().await?;
        console.success("Tools fetched successfully.");
        tools
    } else {
        toolset.tools()
    };
    console.step(&format!("Fetched {} tools from MCP server.", tools.len()));

    let agent = LlmAgent::builder(&settings.app_name)
        .model(&config.model.model)
        .instruction(&settings.instruction)
        .generation_config(config.model.generation.clone())
        .tools(tools)
        .provider(provider)
        .build()?;

    let session_service = Arc::new(InMemorySessionService::new());
    let session = session_service
        .create_session(&settings.app_name, &settings.user_id, None, None)
        .await?;
    let runner = Runner::new(&settings.app_name, agent, session_service);

    console.step("Running agent...");
    let mut events = runner.run(
        &settings.user_id,
        &session.id,
        Content::user_text(&settings.query),
    );

    loop {
        let next = tokio::select! {
            _ = signals.interrupted() => {
                console.warn("Interrupted, stopping the agent");
                return Ok(RunOutcome::Interrupted);
            }
            next = events.next() => next,
        };

        let Some(event) = next else {
            console.warn("Agent finished without a final response");
            return Ok(RunOutcome::Completed);
        };
        let event = event?;

        console.event(&event);
        if event.is_final_response() {
            console.final_response(&event);
            return Ok(RunOutcome::Completed);
        }
    }
}
