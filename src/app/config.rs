//! Pipeline configuration loading from file and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::config::{apply_env_overrides, parse_config_content};
use crate::domain::{AppError, PipelineConfig};

pub const ENV_CONFIG_PATH: &str = "DECKCHAIN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "deckchain.toml";

/// Load configuration from the process environment and working directory.
pub fn load_config() -> Result<PipelineConfig, AppError> {
    let path = resolve_config_path(std::env::var(ENV_CONFIG_PATH).ok(), Path::new("."));
    load_config_from(path.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file at `path` (if any), then environment overrides.
pub fn load_config_from<F>(path: Option<&Path>, lookup: F) -> Result<PipelineConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                AppError::config_error(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            parse_config_content(&content)?
        }
        None => PipelineConfig::default(),
    };

    apply_env_overrides(base, lookup)
}

/// An explicit path always wins; otherwise `deckchain.toml` in `dir` when present.
fn resolve_config_path(explicit: Option<String>, dir: &Path) -> Option<PathBuf> {
    if let Some(explicit) = explicit.filter(|value| !value.trim().is_empty()) {
        return Some(PathBuf::from(explicit.trim()));
    }

    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}
