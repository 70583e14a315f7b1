//! Error kinds and the classified error value returned by the pipeline.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::domain::{ModelTier, StageName};

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Failure taxonomy driving retry and escalation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Model call exceeded its deadline.
    Timeout,
    /// Transport-level failure (connection refused, reset, DNS).
    Network,
    /// Provider reported quota or rate exhaustion.
    RateLimit,
    /// Provider refused the request on content-policy grounds.
    ContentFiltered,
    /// Output could not be parsed or validated, even after recovery.
    Validation,
    /// Anything the classifier does not recognize.
    Unknown,
    /// The caller aborted the run.
    Cancelled,
}

impl ErrorKind {
    /// Whether the same model may be tried again after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Network | ErrorKind::RateLimit | ErrorKind::Unknown
        )
    }

    /// Upper bound on primary-model retries for this kind, if tighter than the
    /// configured maximum.
    pub fn retry_cap(&self) -> Option<u32> {
        match self {
            ErrorKind::Unknown => Some(1),
            _ => None,
        }
    }

    /// Whether a terminal failure of this kind on the primary model moves on to
    /// the fallback model.
    pub fn escalates(&self) -> bool {
        !matches!(self, ErrorKind::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::ContentFiltered => "content_filtered",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tagged with its kind and the stage/attempt where it happened.
#[derive(Debug)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub stage: StageName,
    /// 1-based attempt number; 0 when the failure happened before any model call.
    pub attempt: u32,
    pub tier: Option<ModelTier>,
    /// Provider-requested delay before the next attempt.
    pub retry_after: Option<Duration>,
    cause: Option<BoxedCause>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, stage: StageName, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage,
            attempt: 0,
            tier: None,
            retry_after: None,
            cause: None,
        }
    }

    pub fn with_attempt(mut self, attempt: u32, tier: ModelTier) -> Self {
        self.attempt = attempt;
        self.tier = Some(tier);
        self
    }

    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed", self.stage)?;
        if self.attempt > 0 {
            write!(f, " on attempt {}", self.attempt)?;
        }
        if let Some(tier) = self.tier {
            write!(f, " ({} model)", tier)?;
        }
        write!(f, " [{}]: {}", self.kind, self.message)
    }
}

impl StdError for ClassifiedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn StdError + 'static))
    }
}
