//! Reply orchestrator for the chatting stage.
//!
//! Every chatting turn first passes [`screen`]: banned topics, the access
//! gate, and "no idea what to talk about" are all answered locally without
//! touching history or the provider. Only [`ChatGate::Converse`] turns reach
//! [`ReplyOrchestrator::converse`].
//!
//! Provider failures never escape this module. They become a canned message
//! that is still recorded as the assistant turn, so later context matches
//! what the participant actually saw.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::access::has_access;
use crate::dialogue::texts;
use crate::extract::{is_allowed, wants_topic_suggestion};
use crate::profile::history::{self, HistoryRole};
use crate::profile::{Profile, HISTORY_LIMIT};
use crate::providers::{CompletionRequest, LlmProvider, ProviderError};
use crate::store::{ProfileLease, StoreError};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Outcome of the local checks on a chatting turn, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatGate {
    /// Text touches a banned topic.
    UnsafeTopic,
    /// Trial over and no paid plan.
    Paywalled,
    /// Participant has no topic in mind (or sent nothing).
    NeedsTopic,
    /// Forward to the provider.
    Converse,
}

/// Run the local checks for a chatting turn.
pub fn screen(profile: &Profile, text: &str, now: DateTime<Utc>) -> ChatGate {
    if !is_allowed(text) {
        ChatGate::UnsafeTopic
    } else if !has_access(profile, now) {
        ChatGate::Paywalled
    } else if text.trim().is_empty() || wants_topic_suggestion(text) {
        ChatGate::NeedsTopic
    } else {
        ChatGate::Converse
    }
}

/// Canned text shown instead of a completion when the provider fails.
pub fn fallback_text(error: &ProviderError) -> &'static str {
    match error {
        ProviderError::Exhausted { .. } => texts::PROVIDER_EXHAUSTED,
        ProviderError::Api { .. } | ProviderError::HttpStatus { .. } => texts::PROVIDER_ERROR,
        ProviderError::Request(_) | ProviderError::Parse(_) => texts::PROVIDER_HICCUP,
    }
}

/// Sampling and history settings for provider-backed turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplySettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Response length cap in tokens.
    pub max_tokens: u32,
    /// History bound.
    pub history_limit: usize,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: crate::providers::openai::DEFAULT_MAX_TOKENS,
            history_limit: HISTORY_LIMIT,
        }
    }
}

/// Sends persona plus bounded history to the completion provider.
pub struct ReplyOrchestrator {
    provider: Arc<dyn LlmProvider>,
    settings: ReplySettings,
}

impl std::fmt::Debug for ReplyOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyOrchestrator")
            .field("model", &self.provider.model_id())
            .field("settings", &self.settings)
            .finish()
    }
}

impl ReplyOrchestrator {
    /// Create an orchestrator over `provider`.
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ReplySettings) -> Self {
        Self { provider, settings }
    }

    /// Run one provider-backed turn.
    ///
    /// The caller must have set `persona_prompt`. Both the user turn and the
    /// assistant turn (completion or fallback) are committed before the
    /// answer is returned. The answer is HTML-escaped and prefixed with the
    /// participant's name when known.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if persisting a turn fails.
    pub async fn converse(&self, lease: &mut ProfileLease, text: &str) -> Result<String, StoreError> {
        let limit = self.settings.history_limit;
        history::append(lease.profile_mut(), HistoryRole::User, text, limit);
        lease.commit().await?;

        let request = CompletionRequest {
            messages: lease
                .profile()
                .history
                .iter()
                .map(history::HistoryEntry::to_message)
                .collect(),
            system: lease.profile().persona_prompt.clone(),
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
        };

        let answer = match self.provider.complete(request).await {
            Ok(response) => {
                info!(
                    participant = lease.participant(),
                    model = %response.model,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "completion received"
                );
                response.text
            }
            Err(e) => {
                warn!(
                    participant = lease.participant(),
                    error = %e,
                    kind = ?e.failure_kind(),
                    "completion failed, using fallback"
                );
                fallback_text(&e).to_owned()
            }
        };

        history::append(lease.profile_mut(), HistoryRole::Assistant, answer.as_str(), limit);
        lease.commit().await?;

        let answer = texts::escape_html(&answer);
        Ok(match lease.profile().user_name.as_deref() {
            Some(name) => format!("{}, {answer}", texts::escape_html(name)),
            None => answer,
        })
    }
}
