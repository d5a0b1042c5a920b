//! LLM agent definition
//!
//! An [`LlmAgent`] bundles what the runner needs to drive a conversation:
//! the model and provider, the system instruction and the tools the model
//! may call. It holds no conversation state of its own.

use crate::config::DEFAULT_MODEL;
use crate::error::{AgentError, AgentResult};
use crate::llm::{Content, GenerationConfig, LlmProvider, LlmRequest};
use crate::tools::{Tool, ToolRegistry};
use std::fmt;
use std::sync::Arc;

/// Default cap on model calls per invocation
pub const DEFAULT_MAX_LLM_CALLS: usize = 20;

/// An agent backed by a language model and a set of tools
#[derive(Clone)]
pub struct LlmAgent {
    name: String,
    description: String,
    model: String,
    instruction: Option<String>,
    tools: ToolRegistry,
    generation: GenerationConfig,
    provider: Arc<dyn LlmProvider>,
    max_llm_calls: usize,
}

impl LlmAgent {
    pub fn builder(name: impl Into<String>) -> LlmAgentBuilder {
        LlmAgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn max_llm_calls(&self) -> usize {
        self.max_llm_calls
    }

    /// Request for the next model call over the given history
    pub fn build_request(&self, contents: Vec<Content>) -> LlmRequest {
        LlmRequest {
            model: self.model.clone(),
            system_instruction: self.instruction.clone(),
            contents,
            tools: self.tools.schemas(),
            generation: self.generation.clone(),
        }
    }
}

impl fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmAgent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider.name())
            .field("tools", &self.tools)
            .field("max_llm_calls", &self.max_llm_calls)
            .finish()
    }
}

/// Builder for [`LlmAgent`]
pub struct LlmAgentBuilder {
    name: String,
    description: String,
    model: String,
    instruction: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    generation: GenerationConfig,
    provider: Option<Arc<dyn LlmProvider>>,
    max_llm_calls: usize,
}

impl LlmAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            model: DEFAULT_MODEL.to_string(),
            instruction: None,
            tools: Vec::new(),
            generation: GenerationConfig::default(),
            provider: None,
            max_llm_calls: DEFAULT_MAX_LLM_CALLS,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// System instruction sent with every model call
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools<I>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        self.tools.extend(tools);
        self
    }

    pub fn generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn max_llm_calls(mut self, max: usize) -> Self {
        self.max_llm_calls = max;
        self
    }

    pub fn build(self) -> AgentResult<LlmAgent> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AgentError::config("Agent name must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::config(format!("Agent '{}' has no model", name)));
        }

        let provider = self.provider.ok_or_else(|| {
            AgentError::config(format!("Agent '{}' has no LLM provider", name))
        })?;

        let mut tools = ToolRegistry::new();
        for tool in self.tools {
            tools.register(tool)?;
        }

        Ok(LlmAgent {
            name,
            description: self.description,
            model: self.model,
            instruction: self.instruction,
            tools,
            generation: self.generation,
            provider,
            max_llm_calls: self.max_llm_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmProvider;
    use crate::tools::ToolSchema;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(
                self.0,
                "test tool",
                json!({"type": "object", "properties": {"a": {"type": "number"}}}),
            )
        }

        async fn execute(&self, args: Value) -> AgentResult<Value> {
            Ok(args)
        }
    }

    fn provider() -> Arc<dyn LlmProvider> {
        let mut mock = MockLlmProvider::new();
        mock.expect_name().return_const("mock");
        Arc::new(mock)
    }

    #[test]
    fn test_build_with_defaults() {
        let agent = LlmAgent::builder("Math_assistant")
            .instruction("Help user with Math operations.")
            .tool(Arc::new(NamedTool("add")))
            .provider(provider())
            .build()
            .unwrap();

        assert_eq!(agent.name(), "Math_assistant");
        assert_eq!(agent.model(), DEFAULT_MODEL);
        assert_eq!(agent.max_llm_calls(), DEFAULT_MAX_LLM_CALLS);
        assert_eq!(agent.tools().tool_names(), ["add"]);
    }

    #[test]
    fn test_build_request() {
        let agent = LlmAgent::builder("tavily_search")
            .model("gemini-1.5-pro")
            .instruction("Help user research information over internet.")
            .tools([
                Arc::new(NamedTool("search")) as Arc<dyn Tool>,
                Arc::new(NamedTool("extract")),
            ])
            .generation_config(GenerationConfig {
                temperature: Some(0.1),
                ..Default::default()
            })
            .provider(provider())
            .build()
            .unwrap();

        let request = agent.build_request(vec![Content::user_text("whats Miraidon?")]);
        assert_eq!(request.model, "gemini-1.5-pro");
        assert_eq!(
            request.system_instruction.as_deref(),
            Some("Help user research information over internet.")
        );
        assert_eq!(request.contents.len(), 1);
        let names: Vec<_> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["search", "extract"]);
        assert_eq!(request.generation.temperature, Some(0.1));
    }

    #[test]
    fn test_validation() {
        let err = LlmAgent::builder("  ").provider(provider()).build().unwrap_err();
        assert!(matches!(err, AgentError::Config { .. }));

        let err = LlmAgent::builder("agent").build().unwrap_err();
        assert!(err.to_string().contains("no LLM provider"));

        let err = LlmAgent::builder("agent")
            .provider(provider())
            .tool(Arc::new(NamedTool("add")))
            .tool(Arc::new(NamedTool("add")))
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentError::Tool { .. }));
    }
}
