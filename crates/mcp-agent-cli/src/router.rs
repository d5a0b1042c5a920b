//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands::{self, RunOutcome, SSE_PRESET, STDIO_PRESET};
use crate::console::CliConsole;
use crate::signal_handler::INTERRUPTED_EXIT_CODE;
use anyhow::Result;
use mcp_agent_core::AppConfig;
use std::process::ExitCode;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<ExitCode> {
    let console = CliConsole::new(cli.verbose);
    let config = AppConfig::load(cli.config.as_deref())?;

    let outcome = match &cli.command {
        Commands::Stdio { run, command, args } => {
            let params =
                commands::stdio_connection(&config, run.server.as_deref(), command.as_deref(), args)?;
            let config = config.with_model_override(run.model.clone());
            commands::run_agent(params, &STDIO_PRESET, run, &config, &console).await?
        }
        Commands::Sse { run, url } => {
            let params = commands::sse_connection(&config, run.server.as_deref(), url.as_deref())?;
            let config = config.with_model_override(run.model.clone());
            commands::run_agent(params, &SSE_PRESET, run, &config, &console).await?
        }
        Commands::Tools { target } => {
            let params = commands::any_connection(
                &config,
                target.server.as_deref(),
                target.url.as_deref(),
                target.command.as_deref(),
                &target.args,
            )?;
            commands::list_tools(params, &console).await?;
            RunOutcome::Completed
        }
    };

    Ok(match outcome {
        RunOutcome::Completed => ExitCode::SUCCESS,
        RunOutcome::Interrupted => ExitCode::from(INTERRUPTED_EXIT_CODE),
    })
}
