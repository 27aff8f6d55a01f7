//! Deterministic collaborators for dialogue tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pogovorim::access::FixedClock;
use pogovorim::dialogue::{Dialogue, DialogueSettings};
use pogovorim::persona::SequenceChooser;
use pogovorim::profile::Profile;
use pogovorim::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, UsageStats,
};
use pogovorim::reply::{ReplyOrchestrator, ReplySettings};
use pogovorim::store::{MemoryStore, ProfileRepository, ProfileStore};

/// Start of every test clock.
pub const T0: i64 = 1_700_000_000;

/// Seconds in the default trial.
pub const TRIAL_SECS: i64 = 3 * 24 * 60 * 60;

/// End of the trial opened at [`T0`].
pub const TRIAL_END: i64 = T0 + TRIAL_SECS;

/// Participant used by most tests.
pub const ALICE: &str = "1001";

pub fn at(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).expect("valid timestamp")
}

/// Provider answering from a script and recording every request.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn push_text(&self, text: &str) {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Ok(text.to_owned()));
    }

    pub fn push_error(&self, error: ProviderError) {
        self.script.lock().expect("script lock").push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request);
        tokio::task::yield_now().await;
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse {
                text,
                usage: UsageStats::default(),
                model: "scripted".to_owned(),
            }),
            Some(Err(e)) => Err(e),
            None => Err(ProviderError::Parse("script exhausted".to_owned())),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// A dialogue wired to in-memory fakes.
pub struct Harness {
    pub dialogue: Arc<Dialogue>,
    pub provider: Arc<ScriptedProvider>,
    pub clock: Arc<FixedClock>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    /// Build a harness whose random picks replay `picks`.
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        let provider = Arc::new(ScriptedProvider::default());
        let clock = Arc::new(FixedClock::new(at(T0)));
        let store = Arc::new(MemoryStore::default());
        let dialogue = Dialogue::new(
            ProfileRepository::new(store.clone()),
            ReplyOrchestrator::new(provider.clone(), ReplySettings::default()),
            Box::new(SequenceChooser::new(picks)),
            clock.clone(),
            DialogueSettings::default(),
        );
        Self {
            dialogue: Arc::new(dialogue),
            provider,
            clock,
            store,
        }
    }

    pub async fn say(&self, participant: &str, text: &str) -> String {
        self.dialogue
            .handle_text(participant, Some(text))
            .await
            .expect("turn should be handled")
    }

    pub async fn profile(&self, participant: &str) -> Profile {
        self.store
            .load(participant)
            .await
            .expect("load")
            .expect("profile should exist")
    }

    pub async fn seed(&self, participant: &str, profile: &Profile) {
        self.store.save(participant, profile).await.expect("seed");
    }
}
