//! CLI argument definitions using clap
//!
//! - mcp-agent stdio              # calculator server over stdio pipes
//! - mcp-agent sse --url <url>    # remote server over HTTP+SSE
//! - mcp-agent tools --server x   # list a server's tools

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// User id for the conversation session unless `--user-id` is given
pub const DEFAULT_USER_ID: &str = "user_fs";

#[derive(Parser, Debug)]
#[command(name = "mcp-agent")]
#[command(about = "Run a Gemini agent against the tools of an MCP server")]
#[command(
    long_about = r#"Run a Gemini agent against the tools of an MCP server

USAGE:
  mcp-agent stdio                          # calculator server, "How much is 475 * 23?"
  mcp-agent stdio --command uvx --arg mcp-server-fetch --query "..."
  mcp-agent sse --url http://localhost:8000/sse
  mcp-agent tools --server calculator      # list tools of a configured server

ENVIRONMENT:
  GOOGLE_API_KEY (or GEMINI_API_KEY)       Gemini API key
  SERVER_URL                               default URL for `sse`
  MCP_AGENT_MODEL                          default model
  RUST_LOG                                 log filter (logs go to stderr)"#
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file with model settings and named MCP servers
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// `.env` file to load instead of searching from the current directory
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch an MCP server as a subprocess and ask the agent a question
    #[command(verbatim_doc_comment)]
    Stdio {
        #[command(flatten)]
        run: RunArgs,

        /// Server executable (default: python -m mcp_server_calculator)
        #[arg(long, conflicts_with = "server")]
        command: Option<String>,

        /// Argument for the server executable, repeatable
        #[arg(long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Connect to an MCP server over HTTP+SSE and ask the agent a question
    #[command(verbatim_doc_comment)]
    Sse {
        #[command(flatten)]
        run: RunArgs,

        /// SSE endpoint URL (default: $SERVER_URL)
        #[arg(long, conflicts_with = "server")]
        url: Option<String>,
    },

    /// List the tools an MCP server offers
    #[command(verbatim_doc_comment)]
    Tools {
        #[command(flatten)]
        target: ServerArgs,
    },
}

/// Flags shared by the agent-running commands
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Question for the agent
    #[arg(long, short)]
    pub query: Option<String>,

    /// Gemini model name
    #[arg(long)]
    pub model: Option<String>,

    /// System instruction for the agent
    #[arg(long)]
    pub instruction: Option<String>,

    /// Agent and app name
    #[arg(long)]
    pub agent_name: Option<String>,

    /// Session user id
    #[arg(long, default_value = DEFAULT_USER_ID)]
    pub user_id: String,

    /// Named server from the config file
    #[arg(long)]
    pub server: Option<String>,
}

/// Which server `tools` connects to
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Named server from the config file
    #[arg(long, conflicts_with_all = ["url", "command"])]
    pub server: Option<String>,

    /// SSE endpoint URL
    #[arg(long, conflicts_with = "command")]
    pub url: Option<String>,

    /// Server executable for a stdio server
    #[arg(long)]
    pub command: Option<String>,

    /// Argument for the server executable, repeatable
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,
}
