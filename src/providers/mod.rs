//! Completion provider abstraction layer.
//!
//! Defines the [`LlmProvider`] trait and the shared request/response types.
//! The only implementation is [`openai::OpenAiCompatProvider`], which speaks
//! the OpenAI-style `/chat/completions` protocol (DeepSeek by default).

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod openai;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message.
    System,
    /// Human user message.
    User,
    /// Assistant (LLM) message.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A request to an LLM provider for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Bounded conversation history including the latest user message.
    pub messages: Vec<Message>,
    /// System prompt (injected before messages).
    pub system: Option<String>,
    /// Maximum tokens in the response.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

/// Usage statistics for a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageStats {
    /// Tokens used in the prompt/input.
    pub input_tokens: u32,
    /// Tokens generated in the response.
    pub output_tokens: u32,
}

/// The response from an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Completion text.
    pub text: String,
    /// Token usage.
    pub usage: UsageStats,
    /// The model identifier that served this response.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure (including timeouts).
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status and no error payload.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Provider answered with an explicit `error` object.
    #[error("provider reported an error: {message}")]
    Api {
        /// Sanitized error description.
        message: String,
    },
    /// The provider account ran out of balance or quota.
    #[error("provider balance exhausted: {message}")]
    Exhausted {
        /// Sanitized error payload or response body.
        message: String,
    },
}

/// User-facing category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The provider account ran out of balance or quota.
    Exhausted,
    /// Anything else: transport, timeout, malformed response, other API errors.
    Generic,
}

impl ProviderError {
    /// Error for an explicit `error` payload, given its full description.
    ///
    /// The exhaustion check sees the whole text; only the stored message is
    /// sanitized and truncated.
    pub fn from_error_payload(description: &str) -> Self {
        let message = sanitize_http_error_body(description);
        if mentions_exhaustion(description) {
            Self::Exhausted { message }
        } else {
            Self::Api { message }
        }
    }

    /// Error for a non-success status without an error payload, given the raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let sanitized = sanitize_http_error_body(body);
        if mentions_exhaustion(body) {
            Self::Exhausted { message: sanitized }
        } else {
            Self::HttpStatus {
                status,
                body: sanitized,
            }
        }
    }

    /// Classify this error for the fallback message shown to the participant.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Exhausted { .. } => FailureKind::Exhausted,
            Self::Request(_) | Self::Parse(_) | Self::HttpStatus { .. } | Self::Api { .. } => {
                FailureKind::Generic
            }
        }
    }
}

fn mentions_exhaustion(raw: &str) -> bool {
    raw.to_lowercase().contains("insufficient")
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Collapse whitespace, redact key-like tokens, and cap the length of an error body.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"sk-[A-Za-z0-9_\-]{16,}", r"Bearer\s+[A-Za-z0-9_\-\.]{16,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Core LLM provider interface.
///
/// Implementations must be `Send + Sync` so one provider can serve every
/// participant's turn.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request a completion from the LLM.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;

    /// The model identifier string this provider is instantiated for.
    fn model_id(&self) -> &str;
}
