//! CLI command implementations

pub mod run;
pub mod tools;

pub use run::{RunOutcome, SSE_PRESET, STDIO_PRESET, run_agent};
pub use tools::list_tools;

use anyhow::{Context, Result, bail};
use mcp_agent_core::config::SERVER_URL_ENV_VAR;
use mcp_agent_core::{AppConfig, ConnectionParams, SseServerParams, StdioServerParameters};

/// Calculator server launched by `stdio` when no server is named
pub const DEFAULT_STDIO_COMMAND: &str = "python";
pub const DEFAULT_STDIO_ARGS: [&str; 2] = ["-m", "mcp_server_calculator"];

/// Server for the `stdio` command: a named server, a custom command line or
/// the calculator
pub fn stdio_connection(
    config: &AppConfig,
    server: Option<&str>,
    command: Option<&str>,
    args: &[String],
) -> Result<ConnectionParams> {
    if let Some(name) = server {
        return Ok(config.server(name)?.clone());
    }

    let params = match command {
        Some(command) => StdioServerParameters::new(command).with_args(args.iter().cloned()),
        None if args.is_empty() => {
            StdioServerParameters::new(DEFAULT_STDIO_COMMAND).with_args(DEFAULT_STDIO_ARGS)
        }
        None => StdioServerParameters::new(DEFAULT_STDIO_COMMAND).with_args(args.iter().cloned()),
    };
    Ok(params.into())
}

/// Server for the `sse` command: a named server, `--url` or `SERVER_URL`
pub fn sse_connection(
    config: &AppConfig,
    server: Option<&str>,
    url: Option<&str>,
) -> Result<ConnectionParams> {
    if let Some(name) = server {
        return Ok(config.server(name)?.clone());
    }

    let url = url
        .map(str::to_string)
        .or_else(|| config.server_url.clone())
        .with_context(|| {
            format!(
                "No SSE server URL: pass --url or set {} in the environment or .env",
                SERVER_URL_ENV_VAR
            )
        })?;
    Ok(SseServerParams::new(url).into())
}

/// Server for the `tools` command; one target must be given
pub fn any_connection(
    config: &AppConfig,
    server: Option<&str>,
    url: Option<&str>,
    command: Option<&str>,
    args: &[String],
) -> Result<ConnectionParams> {
    match (server, url, command) {
        (Some(_), _, _) => stdio_connection(config, server, None, &[]),
        (None, Some(_), _) => sse_connection(config, None, url),
        (None, None, Some(_)) => stdio_connection(config, None, command, args),
        (None, None, None) => bail!("Name a server with --server, --url or --command"),
    }
}
