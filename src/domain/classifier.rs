//! Maps raw failures onto the [`ErrorKind`] taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::domain::{ClassifiedError, ErrorKind, ModelTier, StageName};

const RATE_LIMIT_CODES: [&str; 4] =
    ["rate_limit_exceeded", "insufficient_quota", "rate_limit", "resource_exhausted"];
const CONTENT_FILTER_CODES: [&str; 4] =
    ["content_filter", "content_policy_violation", "content_filtered", "safety"];

/// Failure reported by a model client for a single call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelCallError {
    /// The transport gave up waiting for the provider.
    #[error("model call timed out")]
    Timeout,

    /// Connection refused/reset, DNS failure and the like.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// Provider answered with an error.
    #[error(
        "provider error{}: {message}",
        .status.map(|s| format!(" (status={})", s)).unwrap_or_default()
    )]
    Provider {
        status: Option<u16>,
        code: Option<String>,
        message: String,
        retry_after: Option<Duration>,
    },

    /// Provider stopped generation on policy grounds without an error status.
    #[error("response blocked by content filter")]
    ContentFiltered,

    /// Provider returned no text at all.
    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Anything that can go wrong inside one stage attempt, before classification.
#[derive(Debug, Error)]
pub enum RawFailure {
    /// The stage executor's deadline fired before the call returned.
    #[error("no response within {} ms", .0.as_millis())]
    DeadlineElapsed(Duration),

    /// The caller cancelled the run.
    #[error("generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Model(#[from] ModelCallError),

    /// Response text was not parseable JSON.
    #[error("response is not valid JSON: {0}")]
    Parse(String),

    /// Response failed schema validation even after recovery.
    #[error("response failed schema validation: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// Failure inside the executor itself (worker thread, serialization).
    #[error("internal failure: {0}")]
    Internal(String),
}

/// Classify `failure` for `stage`. Total: every failure maps to exactly one kind.
pub fn classify(
    failure: RawFailure,
    stage: StageName,
    attempt: u32,
    tier: ModelTier,
) -> ClassifiedError {
    let (kind, retry_after) = match &failure {
        RawFailure::DeadlineElapsed(_) => (ErrorKind::Timeout, None),
        RawFailure::Cancelled => (ErrorKind::Cancelled, None),
        RawFailure::Parse(_) | RawFailure::Schema(_) => (ErrorKind::Validation, None),
        RawFailure::Internal(_) => (ErrorKind::Unknown, None),
        RawFailure::Model(error) => classify_model_error(error),
    };

    let message = failure.to_string();
    let classified = ClassifiedError::new(kind, stage, message)
        .with_attempt(attempt, tier)
        .with_retry_after(retry_after);

    match failure {
        RawFailure::Model(error) => classified.with_cause(error),
        _ => classified,
    }
}

fn classify_model_error(error: &ModelCallError) -> (ErrorKind, Option<Duration>) {
    match error {
        ModelCallError::Timeout => (ErrorKind::Timeout, None),
        ModelCallError::Transport { .. } => (ErrorKind::Network, None),
        ModelCallError::ContentFiltered => (ErrorKind::ContentFiltered, None),
        ModelCallError::EmptyResponse => (ErrorKind::Unknown, None),
        ModelCallError::Provider { status, code, message, retry_after } => {
            let code = code.as_deref().map(str::to_ascii_lowercase);
            let message = message.to_ascii_lowercase();

            if code.as_deref().is_some_and(|code| CONTENT_FILTER_CODES.contains(&code))
                || message.contains("content policy")
                || message.contains("content management policy")
                || *status == Some(451)
            {
                return (ErrorKind::ContentFiltered, None);
            }

            if *status == Some(429)
                || code.as_deref().is_some_and(|code| RATE_LIMIT_CODES.contains(&code))
                || message.contains("rate limit")
                || message.contains("quota")
            {
                return (ErrorKind::RateLimit, *retry_after);
            }

            match status {
                Some(408) => (ErrorKind::Timeout, None),
                Some(502..=504) => (ErrorKind::Network, None),
                _ => (ErrorKind::Unknown, None),
            }
        }
    }
}
