//! Environment-sourced generator settings.

use thiserror::Error;
use tracing::error;

use crate::llm::client::DEFAULT_ENDPOINT;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const MAX_TOKENS_VAR: &str = "OPENAI_MAX_TOKENS";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable is not set")]
    MissingApiKey,
}

#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// A missing or blank API key is fatal. A non-numeric token limit is
    /// logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_tokens = match lookup(MAX_TOKENS_VAR) {
            None => DEFAULT_MAX_TOKENS,
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                error!(
                    value = %raw,
                    default = DEFAULT_MAX_TOKENS,
                    "invalid value for OPENAI_MAX_TOKENS, using default"
                );
                DEFAULT_MAX_TOKENS
            }),
        };

        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = lookup(MODEL_VAR)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = lookup(BASE_URL_VAR)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            api_key,
            model,
            max_tokens,
            endpoint,
        })
    }
}
