//! mcp-agent CLI application
//!
//! Puts a Gemini agent in front of the tools of one MCP server, asks it a
//! question and prints the events it produces.
//!
//! # Commands
//!
//! - `mcp-agent stdio`: launch a server as a subprocess (default: the
//!   `mcp_server_calculator` Python package) and ask "How much is 475 * 23?"
//! - `mcp-agent sse`: connect to a running server over HTTP+SSE (URL from
//!   `--url` or `SERVER_URL`) and ask "whats Miraidon?"
//! - `mcp-agent tools`: list the tools a server offers
//!
//! Credentials are read from the environment; a `.env` file in the current
//! directory or one of its parents is loaded first and overrides it.

mod args;
mod commands;
mod console;
mod router;
mod signal_handler;

use anyhow::{Context, Result};
use clap::Parser;
use console::CliConsole;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub use args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = CliConsole::new(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            console.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Environment changes must happen before any other thread exists
    let dotenv_source = load_dotenv(cli.env_file.as_deref())?;
    init_tracing(cli.verbose);
    if let Some(path) = dotenv_source {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(router::route(cli))
}

/// Apply `.env` entries over the process environment
fn load_dotenv(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let (source, vars) = mcp_agent_core::config::read_dotenv(path)?;
    for (key, value) in vars {
        // SAFETY: called from `main` before the runtime or any other thread starts
        unsafe { std::env::set_var(key, value) };
    }
    Ok(source)
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,mcp_agent_core=debug,mcp_agent=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
