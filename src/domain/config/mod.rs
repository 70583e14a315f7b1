pub mod parse;
pub mod pipeline;

pub use parse::{apply_env_overrides, parse_config_content};
pub use pipeline::{ModelConfig, PipelineConfig, RetryConfig};
