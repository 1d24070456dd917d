use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use std::env;
use std::time::Duration;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.brevo.com/v3";
pub const DEFAULT_GENERATOR_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Connection settings for the transactional email provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var("BREVO_API_KEY").map_err(|_| DispatchError::MissingConfigError {
            field: "BREVO_API_KEY".to_string(),
        })?;

        Ok(Self {
            api_key,
            base_url: env_string("BREVO_API_URL", DEFAULT_PROVIDER_URL),
            timeout_seconds: env_u64("PROVIDER_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("provider.api_key", &self.api_key)?;
        validate_url("provider.base_url", &self.base_url)?;
        validate_positive_number("provider.timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}

/// Settings for the sequence generation backend.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub timeout_seconds: u64,
    /// Owner of the product catalog listed by `products list`.
    pub user_id: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATOR_URL.to_string(),
            llm_provider: "openai".to_string(),
            llm_model: "gpt-4o".to_string(),
            timeout_seconds: 300,
            user_id: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("GENERATOR_API_URL", &defaults.base_url),
            llm_provider: env_string("GENERATOR_LLM_PROVIDER", &defaults.llm_provider),
            llm_model: env_string("GENERATOR_LLM_MODEL", &defaults.llm_model),
            timeout_seconds: env_u64("GENERATOR_TIMEOUT_SECONDS", defaults.timeout_seconds),
            user_id: env::var("GENERATOR_USER_ID").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validate_url("generator.base_url", &self.base_url)?;
        validate_non_empty_string("generator.llm_provider", &self.llm_provider)?;
        validate_non_empty_string("generator.llm_model", &self.llm_model)?;
        validate_positive_number("generator.timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}
