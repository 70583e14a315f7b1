//! Single model call for one stage attempt.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::domain::{
    CancellationToken, ClassifiedError, DesignSettings, ModelCallError, ModelTier, PartialSpec,
    RawFailure, StageName, classify, recover, validate,
};
use crate::ports::{ChatMessage, ChatRequest, ModelClient};

/// Upper bound on how long a cancellation can go unnoticed while waiting.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

const PRIOR_CONTEXT_HEADER: &str = "Previous stage output:";

/// Everything needed for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct StageCall<'a> {
    pub stage: StageName,
    /// 1-based attempt number across both tiers.
    pub attempt: u32,
    pub tier: ModelTier,
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub prior: Option<&'a PartialSpec>,
    pub design_overrides: &'a DesignSettings,
    pub timeout: Duration,
}

/// Executes stage attempts against a shared model client.
pub struct StageExecutor {
    client: Arc<dyn ModelClient>,
    temperature: f64,
    max_tokens: u32,
}

impl StageExecutor {
    pub fn new(client: Arc<dyn ModelClient>, temperature: f64, max_tokens: u32) -> Self {
        Self { client, temperature, max_tokens }
    }

    pub fn execute(
        &self,
        call: &StageCall<'_>,
        cancel: &CancellationToken,
    ) -> Result<PartialSpec, ClassifiedError> {
        self.try_execute(call, cancel).map_err(|failure| {
            classify(failure, call.stage, call.attempt, call.tier)
        })
    }

    fn try_execute(
        &self,
        call: &StageCall<'_>,
        cancel: &CancellationToken,
    ) -> Result<PartialSpec, RawFailure> {
        let request = ChatRequest {
            model: call.model.to_string(),
            messages: compose_messages(call.system, call.prompt, call.prior)?,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: call.timeout,
        };

        let text = self.complete_within(request, call.timeout, cancel)?;
        if text.trim().is_empty() {
            return Err(ModelCallError::EmptyResponse.into());
        }

        let raw = parse_response(&text)?;
        let spec = match validate(&raw) {
            Ok(spec) => spec,
            Err(_) => validate(&recover(&raw)).map_err(RawFailure::Schema)?,
        };

        Ok(PartialSpec { design: spec.design.overlay(call.design_overrides), ..spec })
    }

    /// Run the blocking client call on a worker thread and stop waiting at `timeout`.
    ///
    /// A call that overruns keeps its worker until the transport gives up; the
    /// result is dropped when it arrives.
    fn complete_within(
        &self,
        request: ChatRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<String, RawFailure> {
        if cancel.is_cancelled() {
            return Err(RawFailure::Cancelled);
        }

        let (tx, rx) = mpsc::channel();
        let client = Arc::clone(&self.client);
        thread::Builder::new()
            .name("deckchain-model-call".to_string())
            .spawn(move || {
                let _ = tx.send(client.complete(request));
            })
            .map_err(|e| RawFailure::Internal(format!("failed to spawn model call: {}", e)))?;

        let deadline = Instant::now() + timeout;
        loop {
            if cancel.is_cancelled() {
                return Err(RawFailure::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RawFailure::DeadlineElapsed(timeout));
            }

            match rx.recv_timeout((deadline - now).min(CANCEL_POLL_INTERVAL)) {
                Ok(result) => return result.map_err(RawFailure::Model),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(RawFailure::Internal(
                        "model call ended without a result".to_string(),
                    ));
                }
            }
        }
    }
}

fn compose_messages(
    system: &str,
    prompt: &str,
    prior: Option<&PartialSpec>,
) -> Result<Vec<ChatMessage>, RawFailure> {
    let mut messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
    if let Some(prior) = prior {
        let serialized = serde_json::to_string_pretty(prior)
            .map_err(|e| RawFailure::Internal(format!("failed to serialize prior spec: {}", e)))?;
        messages.push(ChatMessage::user(format!("{}\n{}", PRIOR_CONTEXT_HEADER, serialized)));
    }
    Ok(messages)
}

/// Parse model text as JSON, tolerating code fences and prose around the object.
fn parse_response(text: &str) -> Result<Value, RawFailure> {
    let trimmed = text.trim();
    let error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for candidate in [fenced_block(trimmed), outer_object(trimmed)].into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    Err(RawFailure::Parse(error.to_string()))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{ErrorKind, Layout};
    use crate::testing::{Scripted, ScriptedModelClient};

    fn executor(client: Arc<ScriptedModelClient>) -> StageExecutor {
        StageExecutor::new(client, 0.2, 512)
    }

    fn call<'a>(
        prior: Option<&'a PartialSpec>,
        overrides: &'a DesignSettings,
        timeout: Duration,
    ) -> StageCall<'a> {
        StageCall {
            stage: StageName::Layout,
            attempt: 1,
            tier: ModelTier::Primary,
            model: "primary-model",
            system: "system text",
            prompt: "layout prompt",
            prior,
            design_overrides: overrides,
            timeout,
        }
    }

    #[test]
    fn sends_system_prompt_and_prior_context() {
        let client = ScriptedModelClient::new(vec![Scripted::reply(json!({"title": "Next"}))]);
        let prior = PartialSpec::titled("Earlier");
        let overrides = DesignSettings::default();

        let spec = executor(client.clone())
            .execute(&call(Some(&prior), &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap();

        assert_eq!(spec.title, "Next");
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::system("system text"));
        assert_eq!(messages[1], ChatMessage::user("layout prompt"));
        assert!(messages[2].content.starts_with(PRIOR_CONTEXT_HEADER));
        assert!(messages[2].content.contains("\"title\": \"Earlier\""));
        assert_eq!(requests[0].model, "primary-model");
        assert_eq!(prior, PartialSpec::titled("Earlier"));
    }

    #[test]
    fn first_stage_has_no_prior_message() {
        let client = ScriptedModelClient::new(vec![Scripted::reply(json!({"title": "First"}))]);
        let overrides = DesignSettings::default();
        executor(client.clone())
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap();
        assert_eq!(client.requests()[0].messages.len(), 2);
    }

    #[test]
    fn deadline_surfaces_as_timeout() {
        let client = ScriptedModelClient::new(vec![Scripted::delayed(
            Duration::from_millis(500),
            Scripted::reply(json!({"title": "Late"})),
        )]);
        let overrides = DesignSettings::default();

        let started = Instant::now();
        let err = executor(client)
            .execute(&call(None, &overrides, Duration::from_millis(50)), &CancellationToken::new())
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn cancelled_token_stops_before_calling() {
        let client = ScriptedModelClient::new(vec![Scripted::reply(json!({"title": "Unused"}))]);
        let overrides = DesignSettings::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = executor(client.clone())
            .execute(&call(None, &overrides, Duration::from_secs(1)), &cancel)
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Cancelled);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn non_json_response_is_validation_error() {
        let client = ScriptedModelClient::new(vec![Scripted::text("Sure! Here is your slide.")]);
        let overrides = DesignSettings::default();
        let err = executor(client)
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn fenced_json_with_prose_is_accepted() {
        let client = ScriptedModelClient::new(vec![Scripted::text(
            "Here you go:\n```json\n{\"title\": \"Fenced\", \"layout\": \"two-column\"}\n```\nEnjoy!",
        )]);
        let overrides = DesignSettings::default();
        let spec = executor(client)
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap();
        assert_eq!(spec.title, "Fenced");
        assert_eq!(spec.layout, Layout::TwoColumn);
    }

    #[test]
    fn invalid_output_is_recovered_once() {
        let client = ScriptedModelClient::new(vec![Scripted::reply(json!({
            "title": "  Recovered  ",
            "layout": "Two Column",
            "bullets": "- one\n- two",
            "mood": "upbeat"
        }))]);
        let overrides = DesignSettings::default();
        let spec = executor(client)
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap();
        assert_eq!(spec.title, "Recovered");
        assert_eq!(spec.layout, Layout::TwoColumn);
        assert_eq!(spec.bullets, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn design_overrides_win_over_model_output() {
        let client = ScriptedModelClient::new(vec![Scripted::reply(json!({
            "title": "Styled",
            "design": {"theme": "dark", "accentColor": "#ff0000"}
        }))]);
        let overrides =
            DesignSettings { accent_color: Some("#00ff00".to_string()), ..DesignSettings::default() };

        let spec = executor(client)
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap();

        assert_eq!(spec.design.theme.as_deref(), Some("dark"));
        assert_eq!(spec.design.accent_color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn provider_failure_is_classified_with_attempt() {
        let client = ScriptedModelClient::new(vec![Scripted::fail(ModelCallError::Transport {
            message: "connection reset".to_string(),
        })]);
        let overrides = DesignSettings::default();
        let err = executor(client)
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.stage, StageName::Layout);
        assert_eq!(err.attempt, 1);
        assert_eq!(err.tier, Some(ModelTier::Primary));
    }

    #[test]
    fn blank_response_is_unknown() {
        let client = ScriptedModelClient::new(vec![Scripted::text("   ")]);
        let overrides = DesignSettings::default();
        let err = executor(client)
            .execute(&call(None, &overrides, Duration::from_secs(1)), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
    }
}
