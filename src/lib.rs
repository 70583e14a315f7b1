//! deckchain: chained model calls that turn a prompt into a slide specification.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde_json::Value;

use adapters::{EmbeddedPromptCatalog, HttpModelClient};

pub use app::{Pipeline, StageOutcome};
pub use domain::{
    AppError, CancellationToken, ClassifiedError, ContentLength, ContentShape, ContentType,
    DesignSettings, ErrorKind, FinalSpec, GenerationParams, Layout, PartialSpec, PipelineConfig,
};

/// Generate one slide specification with configuration from the environment.
pub fn generate(params: &GenerationParams) -> Result<FinalSpec, AppError> {
    let config = app::config::load_config()?;
    let pipeline = build_pipeline(&config)?;
    Ok(pipeline.generate(params)?)
}

/// Build a pipeline over the HTTP model client and the embedded prompts.
pub fn build_pipeline(config: &PipelineConfig) -> Result<Pipeline, AppError> {
    let client = HttpModelClient::from_env_with_config(&config.model)?;
    let prompts = EmbeddedPromptCatalog::new()?;
    Ok(Pipeline::new(Arc::new(client), Arc::new(prompts), config))
}

/// Configuration as resolved from defaults, config file and environment.
pub fn resolved_config() -> Result<PipelineConfig, AppError> {
    app::config::load_config()
}

/// Validate a slide document, repairing it once if needed, and enforce its content shape.
pub fn validate_spec(
    raw: &Value,
    content_type: Option<ContentType>,
    with_image: bool,
) -> Result<FinalSpec, AppError> {
    let spec = match domain::validate(raw) {
        Ok(spec) => spec,
        Err(_) => domain::validate(&domain::recover(raw)).map_err(AppError::InvalidSpec)?,
    };
    let shape = content_type.unwrap_or(ContentType::Bullets);
    Ok(domain::enforce_as(spec, shape, with_image))
}
