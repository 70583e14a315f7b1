//! Diagnostic lines for stage attempts, backoff waits and escalation.

use std::time::Duration;

use chrono::SecondsFormat;

use crate::domain::{AttemptOutcome, ClassifiedError, StageAttempt, StageName};

const MAX_LOG_ERROR_CHARS: usize = 512;

pub fn log_attempt(attempt: &StageAttempt, error: Option<&ClassifiedError>) {
    let outcome = match attempt.outcome {
        AttemptOutcome::Succeeded => "ok".to_string(),
        AttemptOutcome::Failed(kind) => format!("failed[{}]", kind),
    };
    let detail = error.map(|e| format!(": {}", sanitize_and_truncate_for_log(&e.message)));
    eprintln!(
        "[{}] {} stage attempt {} ({} model {}) {} in {} ms{}",
        attempt.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        attempt.stage,
        attempt.attempt,
        attempt.tier,
        attempt.model,
        outcome,
        attempt.duration.as_millis(),
        detail.unwrap_or_default()
    );
}

pub fn log_backoff(stage: StageName, attempt: u32, max_retries: u32, delay: Duration) {
    eprintln!(
        "{} stage attempt {}/{} failed. Retrying in {} ms.",
        stage,
        attempt,
        max_retries,
        delay.as_millis()
    );
}

pub fn log_escalation(stage: StageName, fallback_model: &str, error: &ClassifiedError) {
    eprintln!(
        "{} stage escalating to fallback model {} after [{}] {}",
        stage,
        fallback_model,
        error.kind,
        sanitize_and_truncate_for_log(&error.message)
    );
}

pub fn log_degraded(stage: StageName, error: &ClassifiedError) {
    eprintln!(
        "{} stage degraded to placeholder after [{}] {}",
        stage,
        error.kind,
        sanitize_and_truncate_for_log(&error.message)
    );
}

/// Collapse control characters and whitespace runs, truncating long provider text.
pub fn sanitize_and_truncate_for_log(input: &str) -> String {
    let mut output = String::new();

    for (count, ch) in input.chars().enumerate() {
        if count >= MAX_LOG_ERROR_CHARS {
            break;
        }
        output.push(if ch.is_control() { ' ' } else { ch });
    }

    let mut compact = output.split_whitespace().collect::<Vec<_>>().join(" ");
    if input.chars().count() > MAX_LOG_ERROR_CHARS {
        compact.push_str(" [truncated]");
    }
    compact.trim().to_string()
}
