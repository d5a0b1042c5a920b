//! Configuration management
//!
//! Credentials and the SSE server URL come from the environment (with
//! `.env` support); model choice, generation parameters and named MCP
//! servers can also come from a JSON config file.

pub mod api_key;
pub mod loader;
pub mod model;

pub use api_key::{GOOGLE_API_KEY_VARS, mask_api_key};
pub use loader::{
    BASE_URL_ENV_VAR, MODEL_ENV_VAR, SERVER_URL_ENV_VAR, load_config_file, read_dotenv,
};
pub use model::{AppConfig, ConfigFile, DEFAULT_MODEL, ModelParameters};
