//! CLI console utilities
//!
//! Progress and results go to stdout; errors and interrupt notices go to
//! stderr alongside the logs.

use colored::*;
use mcp_agent_core::mcp::McpTool;
use mcp_agent_core::{AgentError, Event, Part, UnifiedError};

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print a progress line
    pub fn step(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{}", message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error, with its code when it came from the agent library
    pub fn error(&self, error: &anyhow::Error) {
        eprintln!("{} {}", "✗".red().bold(), format_error(error).red());
    }

    pub fn event(&self, event: &Event) {
        println!("{} {}", "Event received:".cyan(), event);
    }

    /// Print the three views of the agent's final answer
    pub fn final_response(&self, event: &Event) {
        let content = event
            .content
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| event.to_string());
        let parts = event
            .content
            .as_ref()
            .map(|c| format_parts(&c.parts))
            .unwrap_or_else(|| "[]".to_string());

        println!("{} {}", "Final response:".green().bold(), content);
        println!("{} {}", "Final response parts:".green().bold(), parts);
        println!("{} {}", "Final response text:".green().bold(), final_text(event));
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.chars().count()).dimmed());
    }

    /// Print one tool of a server listing
    pub fn print_tool(&self, tool: &McpTool) {
        println!(
            "{:24} {}",
            tool.name.magenta().bold(),
            tool.description.as_deref().unwrap_or_default()
        );
        if self.verbose {
            match serde_json::to_string_pretty(&tool.input_schema) {
                Ok(schema) => {
                    for line in schema.lines() {
                        println!("    {}", line.dimmed());
                    }
                }
                Err(_) => println!("    {}", tool.input_schema),
            }
        }
    }
}

/// `[text="...", function_call=name(args)]`
pub fn format_parts(parts: &[Part]) -> String {
    let rendered: Vec<String> = parts.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

/// Text of the first part, or a placeholder when there is none
pub fn final_text(event: &Event) -> String {
    match event.first_text() {
        Some(text) => text.to_string(),
        None => match (&event.error_code, &event.error_message) {
            (Some(code), Some(message)) => format!("<no text: {} {}>", code, message),
            (Some(code), None) => format!("<no text: {}>", code),
            _ => "<no text>".to_string(),
        },
    }
}

/// Outer context messages, then the agent error with its code
fn format_error(error: &anyhow::Error) -> String {
    let mut messages = Vec::new();
    for cause in error.chain() {
        match cause.downcast_ref::<AgentError>() {
            Some(agent_error) => {
                messages.push(format_agent_error(agent_error));
                return messages.join(": ");
            }
            None => messages.push(cause.to_string()),
        }
    }
    format!("{:#}", error)
}

fn format_agent_error(error: &AgentError) -> String {
    match error.context() {
        Some(context) => format!("[{}] {} ({})", error.error_code(), error, context),
        None => format!("[{}] {}", error.error_code(), error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_agent_core::llm::LlmResponse;
    use mcp_agent_core::{Content, Role};
    use serde_json::json;

    #[test]
    fn test_format_parts() {
        let parts = vec![
            Part::text("10925"),
            Part::function_call("multiply", json!({"a": 475, "b": 23})),
        ];
        assert_eq!(
            format_parts(&parts),
            r#"[text="10925", function_call=multiply({"a":475,"b":23})]"#
        );
        assert_eq!(format_parts(&[]), "[]");
    }

    #[test]
    fn test_final_text() {
        let answer = Event::new("inv", "Math_assistant")
            .with_content(Content::new(Role::Model, vec![Part::text("475 * 23 = 10925")]));
        assert_eq!(final_text(&answer), "475 * 23 = 10925");

        let blocked = Event::from_llm_response(
            "inv",
            "tavily_search",
            LlmResponse::from_error("SAFETY", "blocked"),
        );
        assert_eq!(final_text(&blocked), "<no text: SAFETY blocked>");
        assert_eq!(final_text(&Event::new("inv", "x")), "<no text>");
    }

    #[test]
    fn test_agent_error_includes_code_and_context() {
        let error = AgentError::config("Google API key not provided").with_context("building agent");
        assert_eq!(
            format_agent_error(&error),
            "[CONFIG] Configuration error: Google API key not provided (building agent)"
        );
    }

    #[test]
    fn test_error_keeps_outer_context() {
        let error = anyhow::Error::new(AgentError::config("Google API key not provided"))
            .context("Failed to connect to MCP server python -m mcp_server_calculator");
        assert_eq!(
            format_error(&error),
            "Failed to connect to MCP server python -m mcp_server_calculator: \
             [CONFIG] Configuration error: Google API key not provided"
        );
    }

    #[test]
    fn test_plain_error_chain() {
        let error = anyhow::anyhow!("No SSE server URL").context("sse");
        assert_eq!(format_error(&error), "sse: No SSE server URL");
    }
}
