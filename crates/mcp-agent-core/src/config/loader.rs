//! Configuration loading
//!
//! Sources, highest precedence first: command-line overrides (applied by
//! the caller), the JSON config file, environment variables, defaults.

use super::api_key::GOOGLE_API_KEY_VARS;
use super::model::{AppConfig, ConfigFile, ModelParameters};
use crate::error::{AgentError, AgentResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Model override variable
pub const MODEL_ENV_VAR: &str = "MCP_AGENT_MODEL";
/// Gemini endpoint override variable
pub const BASE_URL_ENV_VAR: &str = "GOOGLE_API_BASE_URL";
/// SSE server URL variable
pub const SERVER_URL_ENV_VAR: &str = "SERVER_URL";

impl AppConfig {
    /// Load from the process environment and an optional config file
    pub fn load(config_file: Option<&Path>) -> AgentResult<Self> {
        let file = config_file.map(load_config_file).transpose()?;
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed config file over values from `lookup`
    pub fn resolve<F>(file: Option<ConfigFile>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let file = file.unwrap_or_default();
        let defaults = ModelParameters::default();

        let model = ModelParameters {
            model: file
                .model
                .or_else(|| env(MODEL_ENV_VAR))
                .unwrap_or(defaults.model),
            api_key: GOOGLE_API_KEY_VARS.iter().find_map(|&var| env(var)),
            base_url: file
                .base_url
                .or_else(|| env(BASE_URL_ENV_VAR))
                .unwrap_or(defaults.base_url),
            generation: file.generation,
        };

        Self {
            model,
            server_url: env(SERVER_URL_ENV_VAR),
            servers: file.servers,
        }
    }
}

/// Read and parse a JSON config file
pub fn load_config_file(path: &Path) -> AgentResult<ConfigFile> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AgentError::io_with_path(format!("Failed to read config file: {}", e), path.display().to_string())
    })?;

    let file: ConfigFile = serde_json::from_str(&text).map_err(|e| {
        AgentError::config(format!("Invalid config file {}: {}", path.display(), e))
    })?;

    debug!(servers = file.servers.len(), "Loaded config file {}", path.display());
    Ok(file)
}

/// Variables from a `.env` file and the file they came from
///
/// With `path` unset, `.env` is searched for in the current directory and
/// its parents. A missing file yields no variables. The caller decides how
/// to apply them; `.env` values are meant to override the environment.
pub fn read_dotenv(path: Option<&Path>) -> AgentResult<(Option<PathBuf>, Vec<(String, String)>)> {
    let Some(path) = path.map(Path::to_path_buf).or_else(find_dotenv) else {
        return Ok((None, Vec::new()));
    };

    let iter = match dotenv::from_path_iter(&path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok((None, Vec::new())),
        Err(e) => return Err(AgentError::config(format!("Failed to read {}: {}", path.display(), e))),
    };

    let vars = iter
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AgentError::config(format!("Invalid entry in {}: {}", path.display(), e)))?;

    Ok((Some(path), vars))
}

fn find_dotenv() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}
