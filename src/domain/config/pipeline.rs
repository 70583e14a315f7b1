//! Pipeline configuration model.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AppError;

/// Complete pipeline configuration (`deckchain.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Model provider settings.
    #[serde(default)]
    pub model: ModelConfig,
    /// Retry and backoff settings.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Model provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Chat-completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Model used for every first attempt.
    #[serde(default = "default_primary_model")]
    pub primary: String,
    /// Model used once after the primary gives up. Empty disables escalation.
    #[serde(default = "default_fallback_model")]
    pub fallback: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Hard deadline for a single model call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            primary: default_primary_model(),
            fallback: default_fallback_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Fallback model, when one distinct from the primary is configured.
    pub fn fallback_model(&self) -> Option<&str> {
        let fallback = self.fallback.trim();
        (!fallback.is_empty() && fallback != self.primary.trim()).then_some(fallback)
    }
}

/// Retry and backoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts against the primary model before escalating.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.openai.com/v1/chat/completions")
        .expect("Default API URL must be valid")
}

fn default_primary_model() -> String {
    "gpt-4o".to_string()
}

fn default_fallback_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

impl PipelineConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.model.primary.trim().is_empty() {
            return Err(AppError::config_error("model.primary must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(AppError::config_error(format!(
                "model.temperature must be between 0.0 and 2.0 (got {})",
                self.model.temperature
            )));
        }
        if self.model.max_tokens == 0 {
            return Err(AppError::config_error("model.max_tokens must be greater than 0"));
        }
        if self.model.timeout_ms == 0 {
            return Err(AppError::config_error("model.timeout_ms must be greater than 0"));
        }
        if self.retry.max_retries == 0 {
            return Err(AppError::config_error("retry.max_retries must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_backoff_ms {
            return Err(AppError::config_error(format!(
                "retry.base_delay_ms ({}) must not exceed retry.max_backoff_ms ({})",
                self.retry.base_delay_ms, self.retry.max_backoff_ms
            )));
        }
        Ok(())
    }
}
