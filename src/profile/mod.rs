//! Participant profile: onboarding stage, companion identity, trial, history.
//!
//! One [`Profile`] exists per participant. It is created lazily with
//! defaults on first contact and reinitialised in place by [`Profile::reset`];
//! it is never deleted.
//!
//! The serialized form also accepts legacy JSON documents
//! (`"hello"`/`"intro_name"` stages, `"ты"`/`"вы"` addressing, `"pro"` plan,
//! `trial_until: 0` for an unset trial).

pub mod history;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use self::history::{HistoryEntry, HistoryRole, HISTORY_LIMIT};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Onboarding stage. Moves forward only, except on an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Asking whether the companion should be a friend or a girlfriend.
    #[default]
    #[serde(rename = "greeting", alias = "hello", alias = "picking")]
    Greeting,
    /// Companion introduced itself; waiting for name approval or a new name.
    #[serde(rename = "naming_bot", alias = "intro_name")]
    NamingBot,
    /// Asking for the participant's name and addressing preference.
    #[serde(rename = "naming_user", alias = "intro_user")]
    NamingUser,
    /// Free conversation backed by the completion provider.
    #[serde(rename = "chatting", alias = "chat")]
    Chatting,
}

impl Stage {
    /// Stable label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::NamingBot => "naming_bot",
            Self::NamingUser => "naming_user",
            Self::Chatting => "chatting",
        }
    }
}

/// How the companion addresses the participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Addressing {
    /// Informal "ты".
    #[default]
    #[serde(rename = "informal", alias = "ты")]
    Informal,
    /// Formal "вы".
    #[serde(rename = "formal", alias = "вы")]
    Formal,
}

impl Addressing {
    /// The Russian pronoun for this addressing mode.
    pub fn pronoun(&self) -> &'static str {
        match self {
            Self::Informal => "ты",
            Self::Formal => "вы",
        }
    }
}

/// Gender of the companion persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// A friend ("друг").
    #[serde(rename = "male", alias = "м")]
    Male,
    /// A girlfriend ("подруга").
    #[serde(rename = "female", alias = "ж")]
    Female,
}

impl Gender {
    /// Human-readable label used in the persona prompt and `/profile`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "мужской",
            Self::Female => "женский",
        }
    }
}

/// Apparent age of the companion persona.
///
/// Serialized as a plain string: `"young"`, `"middle"`, `"senior"`, or the
/// raw number the participant gave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgeCategory {
    /// Young adult.
    Young,
    /// Middle-aged.
    Middle,
    /// Older adult.
    Senior,
    /// An explicit age taken verbatim from the participant's text.
    Exact(String),
}

impl AgeCategory {
    /// Human-readable label used in the persona prompt and `/profile`.
    pub fn label(&self) -> &str {
        match self {
            Self::Young => "молодой",
            Self::Middle => "средний",
            Self::Senior => "старший",
            Self::Exact(raw) => raw,
        }
    }
}

impl From<String> for AgeCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "young" | "молодой" => Self::Young,
            "middle" | "средний" => Self::Middle,
            "senior" | "старший" => Self::Senior,
            _ => Self::Exact(raw),
        }
    }
}

impl From<AgeCategory> for String {
    fn from(age: AgeCategory) -> Self {
        match age {
            AgeCategory::Young => "young".to_owned(),
            AgeCategory::Middle => "middle".to_owned(),
            AgeCategory::Senior => "senior".to_owned(),
            AgeCategory::Exact(raw) => raw,
        }
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Billing plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    /// Trial-only access.
    #[default]
    #[serde(rename = "free")]
    Free,
    /// Paid subscription; access regardless of the trial window.
    #[serde(rename = "pro", alias = "paid")]
    Paid,
}

impl Plan {
    /// Stable label used in `/profile`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "pro",
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Everything the bot knows about one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Current onboarding stage.
    #[serde(default)]
    pub stage: Stage,
    /// Addressing mode, informal until the participant says otherwise.
    #[serde(default)]
    pub addressing: Addressing,
    /// Companion name, picked from the pool or proposed by the participant.
    #[serde(default)]
    pub bot_name: Option<String>,
    /// Whether the participant approved or chose the companion name.
    #[serde(default)]
    pub bot_name_confirmed: bool,
    /// Companion gender.
    #[serde(default)]
    pub bot_gender: Option<Gender>,
    /// Companion age.
    #[serde(default, rename = "bot_age")]
    pub bot_age_category: Option<AgeCategory>,
    /// How the participant wants to be called.
    #[serde(default)]
    pub user_name: Option<String>,
    /// System prompt derived from the persona fields; regenerated on change.
    #[serde(default)]
    pub persona_prompt: Option<String>,
    /// Bounded conversation log, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// End of the trial window as a Unix timestamp; `None` until first contact.
    #[serde(default, deserialize_with = "zero_as_none")]
    pub trial_until: Option<i64>,
    /// Billing plan.
    #[serde(default)]
    pub plan: Plan,
}

impl Profile {
    /// Return to the greeting stage, forgetting the companion and the participant's identity.
    ///
    /// Trial window, plan and the chosen addressing are preserved.
    pub fn reset(&mut self) {
        self.stage = Stage::Greeting;
        self.bot_name = None;
        self.bot_name_confirmed = false;
        self.bot_gender = None;
        self.bot_age_category = None;
        self.user_name = None;
        self.persona_prompt = None;
        self.history.clear();
    }
}

/// Legacy documents store an unset trial as `0`.
fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.filter(|ts| *ts > 0))
}
