use std::io;

use thiserror::Error;

use crate::domain::ClassifiedError;

/// Library-wide error type for deckchain operations.
///
/// Pipeline failures themselves are [`ClassifiedError`] values; this type covers
/// everything around the pipeline (configuration, credentials, templates, I/O).
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Required environment variable is not set.
    #[error("Environment variable '{0}' is not set")]
    EnvironmentVariableMissing(String),

    /// Invalid value supplied through an environment override.
    #[error("Invalid value for {var}: {details}")]
    InvalidEnvironmentValue { var: String, details: String },

    /// Prompt template could not be registered or rendered.
    #[error("Prompt template error ({template}): {details}")]
    PromptTemplate { template: String, details: String },

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// Output could not be serialized.
    #[error("Failed to serialize {what}: {details}")]
    Serialize { what: String, details: String },

    /// A slide specification failed validation even after recovery.
    #[error("Slide specification is invalid: {}", .0.join("; "))]
    InvalidSpec(Vec<String>),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Generation pipeline failed.
    #[error(transparent)]
    Generation(#[from] ClassifiedError),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// Coarse `io::ErrorKind` view of the error.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Configuration(_)
            | AppError::InvalidEnvironmentValue { .. }
            | AppError::ParseError { .. }
            | AppError::InvalidSpec(_)
            | AppError::TomlParseError(_) => io::ErrorKind::InvalidInput,
            AppError::EnvironmentVariableMissing(_) => io::ErrorKind::NotFound,
            AppError::PromptTemplate { .. }
            | AppError::Serialize { .. }
            | AppError::HttpClient(_)
            | AppError::Generation(_) => io::ErrorKind::Other,
        }
    }
}
