//! OpenAI-compatible chat-completions client using reqwest.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{AppError, ModelCallError, ModelConfig};
use crate::ports::{ChatMessage, ChatRequest, ModelClient};

pub const ENV_API_KEY: &str = "DECKCHAIN_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_STATUS_MESSAGE: &str = "Model API request failed";
const CONTENT_FILTER_FINISH_REASON: &str = "content_filter";

/// HTTP transport for a chat-completions endpoint.
///
/// This client performs a single request per call. Retries, escalation and the
/// hard per-stage deadline live in the pipeline.
#[derive(Clone)]
pub struct HttpModelClient {
    api_key: String,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModelClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpModelClient {
    /// Create a new HTTP client with the given API key and configuration.
    pub fn new(api_key: String, config: &ModelConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        Ok(Self { api_key, api_url: config.api_url.clone(), client })
    }

    /// Create from environment credentials with the given configuration.
    pub fn from_env_with_config(config: &ModelConfig) -> Result<Self, AppError> {
        let api_key = std::env::var(ENV_API_KEY)
            .or_else(|_| std::env::var(ENV_OPENAI_API_KEY))
            .map_err(|_| AppError::EnvironmentVariableMissing(ENV_API_KEY.into()))?;

        Self::new(api_key, config)
    }

    fn send_request(
        &self,
        request: &ApiRequest<'_>,
        timeout: Duration,
    ) -> Result<String, ModelCallError> {
        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(request)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let retry_after = response.headers().get(RETRY_AFTER).and_then(parse_retry_after);
        let body_text = response.text().map_err(transport_error)?;

        if status.is_success() {
            let api_response: ApiResponse =
                serde_json::from_str(&body_text).map_err(|e| ModelCallError::Provider {
                    status: Some(status.as_u16()),
                    code: None,
                    message: format!("Failed to parse response: {}", e),
                    retry_after: None,
                })?;

            let choice =
                api_response.choices.into_iter().next().ok_or(ModelCallError::EmptyResponse)?;
            if choice.finish_reason.as_deref() == Some(CONTENT_FILTER_FINISH_REASON) {
                return Err(ModelCallError::ContentFiltered);
            }

            let content = choice.message.content.unwrap_or_default();
            if content.trim().is_empty() {
                return Err(ModelCallError::EmptyResponse);
            }
            return Ok(content);
        }

        let (message, code) = extract_error(&body_text);
        let message = message.unwrap_or_else(|| {
            if !body_text.trim().is_empty() {
                body_text.clone()
            } else if status.as_u16() == 429 {
                "Rate limited".to_string()
            } else if status.is_server_error() {
                "Server error".to_string()
            } else {
                DEFAULT_STATUS_MESSAGE.to_string()
            }
        });

        Err(ModelCallError::Provider { status: Some(status.as_u16()), code, message, retry_after })
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

fn transport_error(error: reqwest::Error) -> ModelCallError {
    if error.is_timeout() {
        ModelCallError::Timeout
    } else {
        ModelCallError::Transport { message: error.to_string() }
    }
}

/// Pull `error.message` and `error.code` (or `error.type`) from a provider error body.
fn extract_error(body: &str) -> (Option<String>, Option<String>) {
    if body.trim().is_empty() {
        return (None, None);
    }

    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, None);
    };

    let Some(error) = parsed.get("error") else {
        let message = parsed.get("message").and_then(|m| m.as_str()).map(ToOwned::to_owned);
        return (message, None);
    };

    if let Some(message) = error.as_str() {
        return (Some(message.to_string()), None);
    }

    let message = error.get("message").and_then(|m| m.as_str()).map(ToOwned::to_owned);
    let code = error
        .get("code")
        .and_then(|c| c.as_str())
        .or_else(|| error.get("type").and_then(|t| t.as_str()))
        .map(ToOwned::to_owned);
    (message, code)
}

fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    let raw = value.to_str().ok()?.trim();
    let seconds = raw.parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

impl ModelClient for HttpModelClient {
    fn complete(&self, request: ChatRequest) -> Result<String, ModelCallError> {
        let api_request = ApiRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        self.send_request(&api_request, request.timeout)
    }
}
