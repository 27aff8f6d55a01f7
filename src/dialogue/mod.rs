//! Dialogue state machine.
//!
//! One inbound text turn is handled in three steps:
//!
//! 1. [`classify`] runs the rule extractors that apply to the current
//!    [`Stage`] and produces an [`Intent`]. Competing rules are declared as
//!    ordered [`Matcher`] lists, so precedence is explicit.
//! 2. [`next_stage`] is the transition table: `(stage, intent) -> stage`.
//!    Anything not listed keeps the stage.
//! 3. [`Dialogue`] applies the intent's side effects to the profile,
//!    commits, and renders the reply from [`texts`].
//!
//! Commands (`start`, `reset`, `profile`, `help`) bypass the state machine.

pub mod texts;

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::access::{self, Clock};
use crate::extract::{
    extract_addressing, extract_bot_name, extract_gender, extract_user_name, first_match,
    is_allowed, is_negative_reply, is_political, is_positive_reply, looks_like_topic_request,
    Matcher,
};
use crate::persona::{self, Chooser};
use crate::profile::{Addressing, Gender, Profile, Stage};
use crate::reply::{screen, ChatGate, ReplyOrchestrator};
use crate::store::{ProfileLease, ProfileRepository, StoreError};

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// What a turn means, given the stage it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Greeting: participant chose a friend or a girlfriend.
    CompanionChosen(Gender),
    /// Greeting: no gender recognized.
    CompanionUnclear,
    /// Naming the companion: current name approved.
    NameApproved,
    /// Naming the companion: participant proposed a name.
    NameProposed(String),
    /// Naming the companion: name rejected without an alternative.
    NameDeclined,
    /// Naming the companion: nothing recognized.
    NameUnclear,
    /// Naming the participant: asked for a political or banned topic first.
    TopicRefused,
    /// Naming the participant: asked for a topic before introducing themselves.
    TopicDeferred,
    /// Naming the participant: name and addressing resolved.
    Introduced {
        /// Extracted name, or the previously stored one.
        user_name: Option<String>,
        /// Extracted addressing, or the previously stored one.
        addressing: Addressing,
    },
    /// Chatting: outcome of the local checks.
    Chat(ChatGate),
}

/// Signals recognized while the companion's name is being settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingSignal {
    /// Keep the current name.
    Approve,
    /// Use this name instead.
    Propose(String),
    /// Reject the name.
    Decline,
}

fn approval(text: &str) -> Option<NamingSignal> {
    is_positive_reply(text).then_some(NamingSignal::Approve)
}

fn candidate_name(text: &str) -> Option<NamingSignal> {
    extract_bot_name(text).map(NamingSignal::Propose)
}

fn disapproval(text: &str) -> Option<NamingSignal> {
    is_negative_reply(text).then_some(NamingSignal::Decline)
}

/// Rules for the naming stage in precedence order. Approval wins ties.
pub static NAMING_MATCHERS: &[Matcher<NamingSignal>] = &[
    Matcher::new("approval", approval),
    Matcher::new("candidate_name", candidate_name),
    Matcher::new("disapproval", disapproval),
];

/// Interpret `text` for a participant currently in `profile.stage`.
pub fn classify(profile: &Profile, text: &str, now: DateTime<Utc>) -> Intent {
    match profile.stage {
        Stage::Greeting => extract_gender(text).map_or(Intent::CompanionUnclear, Intent::CompanionChosen),
        Stage::NamingBot => match first_match(NAMING_MATCHERS, text) {
            Some((rule, signal)) => {
                debug!(rule, "naming rule matched");
                match signal {
                    NamingSignal::Approve => Intent::NameApproved,
                    NamingSignal::Propose(name) => Intent::NameProposed(name),
                    NamingSignal::Decline => Intent::NameDeclined,
                }
            }
            None => Intent::NameUnclear,
        },
        Stage::NamingUser => {
            if looks_like_topic_request(text) {
                if is_political(text) || !is_allowed(text) {
                    Intent::TopicRefused
                } else {
                    Intent::TopicDeferred
                }
            } else {
                Intent::Introduced {
                    user_name: extract_user_name(text).or_else(|| profile.user_name.clone()),
                    addressing: extract_addressing(text, profile.addressing),
                }
            }
        }
        Stage::Chatting => Intent::Chat(screen(profile, text, now)),
    }
}

/// Transition table.
pub fn next_stage(stage: Stage, intent: &Intent) -> Stage {
    match (stage, intent) {
        (Stage::Greeting, Intent::CompanionChosen(_)) => Stage::NamingBot,
        (Stage::NamingBot, Intent::NameApproved | Intent::NameProposed(_)) => Stage::NamingUser,
        (Stage::NamingUser, Intent::Introduced { .. }) => Stage::Chatting,
        (stage, _) => stage,
    }
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// Settings consumed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueSettings {
    /// Trial length in days.
    pub trial_days: u32,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            trial_days: access::DEFAULT_TRIAL_DAYS,
        }
    }
}

/// Turn handler shared by every participant.
pub struct Dialogue {
    repository: ProfileRepository,
    replies: ReplyOrchestrator,
    chooser: Mutex<Box<dyn Chooser>>,
    clock: Arc<dyn Clock>,
    settings: DialogueSettings,
}

impl std::fmt::Debug for Dialogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dialogue")
            .field("repository", &self.repository)
            .field("replies", &self.replies)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Dialogue {
    /// Assemble a dialogue from its collaborators.
    pub fn new(
        repository: ProfileRepository,
        replies: ReplyOrchestrator,
        chooser: Box<dyn Chooser>,
        clock: Arc<dyn Clock>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            repository,
            replies,
            chooser: Mutex::new(chooser),
            clock,
            settings,
        }
    }

    fn with_chooser<R>(&self, f: impl FnOnce(&mut dyn Chooser) -> R) -> R {
        let mut guard = self.chooser.lock().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_mut())
    }

    fn rebuild_persona(&self, profile: &mut Profile) {
        let prompt = self.with_chooser(|chooser| persona::build_persona(profile, chooser));
        profile.persona_prompt = Some(prompt);
    }

    // -- Commands ----------------------------------------------------------

    /// `start`: begin the trial if needed and return to the greeting stage.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the profile cannot be persisted.
    pub async fn start(&self, participant: &str) -> Result<String, StoreError> {
        let mut lease = self.repository.checkout(participant).await?;
        let now = self.clock.now();
        if access::ensure_trial_started(lease.profile_mut(), now, self.settings.trial_days) {
            info!(participant, trial_until = ?lease.profile().trial_until, "trial started");
        }
        lease.profile_mut().stage = Stage::Greeting;
        lease.commit().await?;
        Ok(texts::WELCOME.to_owned())
    }

    /// `reset`: forget identities, persona and history; keep trial, plan and addressing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the profile cannot be persisted.
    pub async fn reset(&self, participant: &str) -> Result<String, StoreError> {
        let mut lease = self.repository.checkout(participant).await?;
        lease.profile_mut().reset();
        lease.commit().await?;
        info!(participant, "profile reset");
        Ok(texts::RESET.to_owned())
    }

    /// `profile`: summarize what the bot knows about the participant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the profile cannot be loaded.
    pub async fn profile_summary(&self, participant: &str) -> Result<String, StoreError> {
        let lease = self.repository.checkout(participant).await?;
        let days = access::trial_days_left(lease.profile(), self.clock.now());
        Ok(texts::profile_summary(lease.profile(), days))
    }

    /// `help`: static command list.
    pub fn help(&self) -> String {
        texts::HELP.to_owned()
    }

    // -- Turns -------------------------------------------------------------

    /// Handle one inbound text turn and return the reply.
    ///
    /// Absent text is treated as empty. The trial window starts on the first
    /// turn if `start` was never sent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the profile cannot be loaded or persisted.
    pub async fn handle_text(&self, participant: &str, text: Option<&str>) -> Result<String, StoreError> {
        let text = text.unwrap_or_default().trim();
        let mut lease = self.repository.checkout(participant).await?;
        let now = self.clock.now();

        if access::ensure_trial_started(lease.profile_mut(), now, self.settings.trial_days) {
            lease.commit().await?;
            info!(participant, trial_until = ?lease.profile().trial_until, "trial started");
        }

        let stage = lease.profile().stage;
        let intent = classify(lease.profile(), text, now);
        let next = next_stage(stage, &intent);
        info!(
            participant,
            stage = stage.as_str(),
            next = next.as_str(),
            text_len = text.chars().count(),
            "turn classified"
        );
        debug!(?intent, "intent");

        self.apply(&mut lease, text, intent, next).await
    }

    async fn apply(
        &self,
        lease: &mut ProfileLease,
        text: &str,
        intent: Intent,
        next: Stage,
    ) -> Result<String, StoreError> {
        let reply = match intent {
            Intent::CompanionUnclear => texts::ASK_COMPANION.to_owned(),
            Intent::CompanionChosen(gender) => {
                let profile = lease.profile_mut();
                if profile.bot_age_category.is_none() {
                    profile.bot_age_category =
                        Some(self.with_chooser(persona::pick_default_age));
                }
                let name = self.with_chooser(|chooser| persona::pick_name(gender, chooser));
                profile.bot_gender = Some(gender);
                profile.bot_name = Some(name.clone());
                profile.bot_name_confirmed = false;
                self.rebuild_persona(profile);
                profile.stage = next;
                lease.commit().await?;
                texts::introduction(gender, &name)
            }
            Intent::NameApproved => {
                let profile = lease.profile_mut();
                profile.bot_name_confirmed = true;
                profile.stage = next;
                lease.commit().await?;
                texts::NAME_KEPT.to_owned()
            }
            Intent::NameProposed(name) => {
                let profile = lease.profile_mut();
                profile.bot_name = Some(name.clone());
                profile.bot_name_confirmed = true;
                self.rebuild_persona(profile);
                profile.stage = next;
                lease.commit().await?;
                texts::name_changed(&name)
            }
            Intent::NameDeclined => texts::NAME_DECLINED.to_owned(),
            Intent::NameUnclear => texts::name_unclear(lease.profile()),
            Intent::TopicRefused => texts::TOPIC_REFUSED.to_owned(),
            Intent::TopicDeferred => texts::TOPIC_DEFERRED.to_owned(),
            Intent::Introduced {
                user_name,
                addressing,
            } => {
                let profile = lease.profile_mut();
                let addressing_changed = profile.addressing != addressing;
                profile.user_name = user_name;
                profile.addressing = addressing;
                if addressing_changed || profile.persona_prompt.is_none() {
                    self.rebuild_persona(profile);
                }
                profile.stage = next;
                lease.commit().await?;
                texts::welcome(lease.profile(), lease.profile().user_name.as_deref())
            }
            Intent::Chat(ChatGate::UnsafeTopic) => texts::SAFE_TOPIC.to_owned(),
            Intent::Chat(ChatGate::Paywalled) => texts::PAYWALL.to_owned(),
            Intent::Chat(ChatGate::NeedsTopic) => {
                let starter = self
                    .with_chooser(|chooser| persona::pick(chooser, texts::STARTERS).copied())
                    .unwrap_or(texts::SAFE_TOPIC);
                starter.to_owned()
            }
            Intent::Chat(ChatGate::Converse) => {
                if lease.profile().persona_prompt.is_none() {
                    self.rebuild_persona(lease.profile_mut());
                }
                self.replies.converse(lease, text).await?
            }
        };
        Ok(reply)
    }
}
