//! Bounded conversation history.

use serde::{Deserialize, Serialize};

use crate::providers::{Message, Role};

use super::Profile;

/// Default number of turns kept per participant.
pub const HISTORY_LIMIT: usize = 12;

/// Author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    /// The participant.
    User,
    /// The companion.
    Assistant,
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who said it.
    pub role: HistoryRole,
    /// What was said, as shown to the participant.
    pub content: String,
}

impl HistoryEntry {
    /// A participant turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            content: content.into(),
        }
    }

    /// A companion turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Assistant,
            content: content.into(),
        }
    }

    /// Convert into a provider message.
    pub fn to_message(&self) -> Message {
        let role = match self.role {
            HistoryRole::User => Role::User,
            HistoryRole::Assistant => Role::Assistant,
        };
        Message {
            role,
            content: self.content.clone(),
        }
    }
}

/// Append a turn and evict the oldest entries beyond `limit`.
///
/// A `limit` of zero is treated as one so the latest turn is always kept.
pub fn append(profile: &mut Profile, role: HistoryRole, content: impl Into<String>, limit: usize) {
    profile.history.push(HistoryEntry {
        role,
        content: content.into(),
    });
    let limit = limit.max(1);
    let overflow = profile.history.len().saturating_sub(limit);
    if overflow > 0 {
        profile.history.drain(..overflow);
    }
}
