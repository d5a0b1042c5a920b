//! Tool registry for managing available tools

use super::base::Tool;
use super::types::ToolSchema;
use crate::error::{AgentError, AgentResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Name-keyed tool lookup that keeps registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names must be unique
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> AgentResult<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::tool(name, "a tool with this name is already registered"));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Schemas of every tool in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Get all tools
    pub fn all_tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echo the arguments back"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new(self.0, self.description(), json!({"type": "object"}))
        }

        async fn execute(&self, args: Value) -> AgentResult<Value> {
            Ok(args)
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(Arc::new(EchoTool(name))).unwrap();
        }

        assert_eq!(registry.tool_names(), ["zeta", "alpha", "mid"]);
        assert_eq!(registry.schemas()[1].name, "alpha");
        assert_eq!(registry.len(), 3);
        assert!(registry.has_tool("mid"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("add"))).unwrap();

        let err = registry.register(Arc::new(EchoTool("add"))).unwrap_err();
        assert!(matches!(err, AgentError::Tool { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo"))).unwrap();

        let tool = registry.get("echo").unwrap();
        let out = tool.execute(json!({"x": 1})).await.unwrap();
        assert_eq!(out, json!({"x": 1}));
    }
}
