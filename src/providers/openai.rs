//! OpenAI-compatible provider using the `/chat/completions` API.
//!
//! DeepSeek, OpenAI, and most hosted gateways accept this wire format.
//! Error payloads (`{"error": ...}`) are recognised even on HTTP 200.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmProvider, ProviderError, Role, UsageStats};

/// Default endpoint: DeepSeek chat completions.
pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-chat";
/// Response length cap used when a request does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 600;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// System prompt followed by history.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum completion tokens.
    pub max_tokens: u32,
}

/// A message in chat completions format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (`system`, `user`, `assistant`).
    pub role: String,
    /// Text content.
    pub content: Option<String>,
}

/// Chat completions response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response choices.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Model that served the response.
    #[serde(default)]
    pub model: String,
    /// Token usage.
    pub usage: Option<ChatUsage>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Assistant message for this choice.
    pub message: ChatMessage,
}

/// Usage statistics.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    /// Prompt token count.
    pub prompt_tokens: Option<u32>,
    /// Completion token count.
    pub completion_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat completions provider.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    endpoint: String,
    model_name: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("endpoint", &self.endpoint)
            .field("model_name", &self.model_name)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatProvider {
    /// Create a provider for `endpoint` and `model_name`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Request` if the HTTP client cannot be built.
    pub fn new(
        endpoint: String,
        model_name: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            model_name,
            api_key,
            client,
        })
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a chat completions request from a completion request.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> ChatRequest {
    let mut messages: Vec<ChatMessage> = Vec::with_capacity(request.messages.len().saturating_add(1));

    if let Some(system) = &request.system {
        messages.push(ChatMessage {
            role: Role::System.as_str().to_owned(),
            content: Some(system.clone()),
        });
    }

    messages.extend(request.messages.iter().map(|msg| ChatMessage {
        role: msg.role.as_str().to_owned(),
        content: Some(msg.content.clone()),
    }));

    ChatRequest {
        model: model.to_owned(),
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    }
}

/// Parse a chat completions response body.
///
/// An `error` member takes precedence over everything else.
///
/// # Errors
///
/// Returns `ProviderError::Exhausted` or `ProviderError::Api` for an error
/// payload, and `ProviderError::Parse` if the body is not JSON or has no
/// usable first choice.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if let Some(error) = value.get("error") {
        return Err(ProviderError::from_error_payload(&describe_error(error)));
    }

    let resp: ChatResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    let text = choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ProviderError::Parse("empty completion content".to_owned()))?;

    let usage = UsageStats {
        input_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.prompt_tokens)
            .unwrap_or(0),
        output_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.completion_tokens)
            .unwrap_or(0),
    };

    Ok(CompletionResponse {
        text,
        usage,
        model: resp.model,
    })
}

fn describe_error(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => {
            let parts: Vec<&str> = ["message", "type", "code"]
                .iter()
                .filter_map(|key| fields.get(*key).and_then(Value::as_str))
                .collect();
            if parts.is_empty() {
                error.to_string()
            } else {
                parts.join(" ")
            }
        }
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(&self.model_name, &request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&api_request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "provider responded");

        match parse_response(&body) {
            Ok(parsed) if status.is_success() => Ok(parsed),
            Err(err @ (ProviderError::Api { .. } | ProviderError::Exhausted { .. })) => Err(err),
            _ if !status.is_success() => Err(ProviderError::from_status(status.as_u16(), &body)),
            other => other,
        }
    }

    fn model_id(&self) -> &str {
        &self.model_name
    }
}
