//! Application configuration.
//!
//! Client handles are constructed from an explicit [`AppConfig`] — keys and
//! endpoints are passed in at construction time, never read from ambient
//! global state, so every collaborator can be swapped for a fake in tests.

use tracing::{debug, info};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

#[derive(Debug, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl AppConfig {
    pub fn new(openai_api_key: impl Into<String>) -> Self {
        AppConfig {
            openai_api_key: openai_api_key.into(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = model.into();
        self
    }

    /// Build from the environment (`OPENAI_API_KEY`, optional
    /// `OPENAI_BASE_URL` and `OPENAI_MODEL`). Loads `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError("OPENAI_API_KEY environment variable not set".to_string()))?;

        let mut config = AppConfig::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.openai_base_url = base_url;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.openai_model = model;
        }
        Ok(config)
    }

    /// Log the non-secret fields.
    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.openai_base_url,
            model = %self.openai_model,
            "Loaded AppConfig"
        );
        debug!(key_present = !self.openai_api_key.is_empty(), "API key state");
    }
}
