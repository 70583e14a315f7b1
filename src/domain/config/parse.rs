//! Pure parse/validate for pipeline configuration.

use std::str::FromStr;

use url::Url;

use crate::domain::{AppError, PipelineConfig};

pub const ENV_API_URL: &str = "DECKCHAIN_API_URL";
pub const ENV_PRIMARY_MODEL: &str = "DECKCHAIN_PRIMARY_MODEL";
pub const ENV_FALLBACK_MODEL: &str = "DECKCHAIN_FALLBACK_MODEL";
pub const ENV_TEMPERATURE: &str = "DECKCHAIN_TEMPERATURE";
pub const ENV_MAX_TOKENS: &str = "DECKCHAIN_MAX_TOKENS";
pub const ENV_TIMEOUT_MS: &str = "DECKCHAIN_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "DECKCHAIN_MAX_RETRIES";
pub const ENV_BASE_DELAY_MS: &str = "DECKCHAIN_BASE_DELAY_MS";
pub const ENV_MAX_BACKOFF_MS: &str = "DECKCHAIN_MAX_BACKOFF_MS";

/// Parse and validate pipeline configuration from TOML content.
pub fn parse_config_content(content: &str) -> Result<PipelineConfig, AppError> {
    let config: PipelineConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Apply environment overrides on top of `config`, then re-validate.
///
/// `lookup` abstracts the environment so callers and tests can supply their own.
pub fn apply_env_overrides<F>(
    mut config: PipelineConfig,
    lookup: F,
) -> Result<PipelineConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_API_URL) {
        config.model.api_url = Url::parse(raw.trim()).map_err(|e| invalid(ENV_API_URL, e))?;
    }
    if let Some(raw) = lookup(ENV_PRIMARY_MODEL) {
        config.model.primary = raw.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_FALLBACK_MODEL) {
        config.model.fallback = raw.trim().to_string();
    }
    if let Some(raw) = lookup(ENV_TEMPERATURE) {
        config.model.temperature = parse_env(ENV_TEMPERATURE, &raw)?;
    }
    if let Some(raw) = lookup(ENV_MAX_TOKENS) {
        config.model.max_tokens = parse_env(ENV_MAX_TOKENS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
        config.model.timeout_ms = parse_env(ENV_TIMEOUT_MS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_MAX_RETRIES) {
        config.retry.max_retries = parse_env(ENV_MAX_RETRIES, &raw)?;
    }
    if let Some(raw) = lookup(ENV_BASE_DELAY_MS) {
        config.retry.base_delay_ms = parse_env(ENV_BASE_DELAY_MS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_MAX_BACKOFF_MS) {
        config.retry.max_backoff_ms = parse_env(ENV_MAX_BACKOFF_MS, &raw)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_env<T>(var: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(var, e))
}

fn invalid(var: &str, details: impl std::fmt::Display) -> AppError {
    AppError::InvalidEnvironmentValue { var: var.to_string(), details: details.to_string() }
}
