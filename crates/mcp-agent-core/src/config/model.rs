//! Configuration model

use super::api_key::mask_api_key;
use crate::error::{AgentError, AgentResult};
use crate::llm::{DEFAULT_GOOGLE_BASE_URL, GenerationConfig, GoogleProvider};
use crate::mcp::ConnectionParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model used when nothing else selects one
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Model selection and credentials
#[derive(Clone, PartialEq)]
pub struct ModelParameters {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub generation: GenerationConfig,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

impl ModelParameters {
    /// The API key, or a configuration error naming where to set it
    pub fn require_api_key(&self) -> AgentResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AgentError::config(
                    "Google API key not provided; set GOOGLE_API_KEY (or GEMINI_API_KEY) in the environment or .env",
                )
            })
    }

    /// Display-safe version of the API key
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_api_key)
    }

    /// Build the Gemini provider these parameters describe
    pub fn build_provider(&self) -> AgentResult<GoogleProvider> {
        let key = self.require_api_key()?;
        Ok(GoogleProvider::new(key)?.with_base_url(self.base_url.clone()))
    }
}

impl std::fmt::Debug for ModelParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelParameters")
            .field("model", &self.model)
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Resolved application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub model: ModelParameters,
    /// SSE server URL from `SERVER_URL`
    pub server_url: Option<String>,
    /// Named MCP servers from the config file
    pub servers: HashMap<String, ConnectionParams>,
}

impl AppConfig {
    /// Look up a named server from the config file
    pub fn server(&self, name: &str) -> AgentResult<&ConnectionParams> {
        self.servers.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.servers.keys().map(String::as_str).collect();
            known.sort_unstable();
            AgentError::not_found(
                "server",
                format!(
                    "MCP server '{}' is not defined in the config file (known: {})",
                    name,
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                ),
            )
        })
    }

    /// Apply a command-line model override
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            self.model.model = model;
        }
        self
    }
}

/// On-disk JSON configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub servers: HashMap<String, ConnectionParams>,
}
