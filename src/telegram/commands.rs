//! Telegram slash commands.
//!
//! Commands bypass the dialogue state machine. Each returns an
//! HTML-formatted reply.

use crate::dialogue::{texts, Dialogue};
use crate::store::StoreError;

/// A recognized (or unrecognized) slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Begin or restart the introduction.
    Start,
    /// Forget identities and history.
    Reset,
    /// Show the stored profile.
    Profile,
    /// List commands.
    Help,
    /// Anything else after a slash.
    Unknown(String),
}

impl Command {
    /// Parse `text` as a command. Returns `None` for ordinary text.
    ///
    /// Arguments are ignored and an `@botname` suffix is stripped, so
    /// `/start@pogovorim_bot payload` is [`Command::Start`].
    pub fn parse(text: &str) -> Option<Self> {
        let without_slash = text.trim_start().strip_prefix('/')?;
        let full_command = without_slash.split_whitespace().next().unwrap_or_default();
        let command = full_command.split('@').next().unwrap_or(full_command);

        Some(match command.to_lowercase().as_str() {
            "start" => Self::Start,
            "reset" => Self::Reset,
            "profile" => Self::Profile,
            "help" => Self::Help,
            _ => Self::Unknown(command.to_owned()),
        })
    }

    /// Stable label used in logs.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Reset => "reset",
            Self::Profile => "profile",
            Self::Help => "help",
            Self::Unknown(name) => name,
        }
    }
}

/// Run `command` for `participant`.
///
/// # Errors
///
/// Returns [`StoreError`] if the participant's profile cannot be loaded or saved.
pub async fn dispatch(
    command: &Command,
    dialogue: &Dialogue,
    participant: &str,
) -> Result<String, StoreError> {
    match command {
        Command::Start => dialogue.start(participant).await,
        Command::Reset => dialogue.reset(participant).await,
        Command::Profile => dialogue.profile_summary(participant).await,
        Command::Help => Ok(dialogue.help()),
        Command::Unknown(name) => Ok(texts::unknown_command(name)),
    }
}
