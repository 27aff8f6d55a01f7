//! Profile persistence.
//!
//! A [`ProfileStore`] only loads and saves whole profiles; it knows no
//! business rules. [`ProfileRepository`] wraps a store with one async lock per
//! participant, so a turn's read-modify-write (including the wait on the
//! completion provider) is serialized per participant while different
//! participants proceed concurrently.
//!
//! Three backends are provided:
//! - [`memory::MemoryStore`]: process-local map, used by tests and the `memory` backend
//! - [`json::JsonFileStore`]: one JSON document rewritten on every save
//! - [`sqlite::SqliteStore`]: one SQLite row per participant

pub mod json;
pub mod memory;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::profile::Profile;

pub use self::json::JsonFileStore;
pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from profile persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("profile store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be (de)serialized.
    #[error("profile document error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Raw profile persistence keyed by participant identifier.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a profile, or `None` if the participant was never seen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn load(&self, participant: &str) -> Result<Option<Profile>, StoreError>;

    /// Persist a full profile snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    async fn save(&self, participant: &str, profile: &Profile) -> Result<(), StoreError>;

    /// Identifiers of every stored participant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn participants(&self) -> Result<Vec<String>, StoreError>;
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Serialized read-modify-write access to profiles.
pub struct ProfileRepository {
    store: Arc<dyn ProfileStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ProfileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileRepository").finish_non_exhaustive()
    }
}

impl ProfileRepository {
    /// Wrap `store`.
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Take exclusive access to a participant's profile.
    ///
    /// Unknown participants get a default profile, persisted immediately.
    /// The lease holds the participant's lock until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the profile cannot be loaded or created.
    pub async fn checkout(&self, participant: &str) -> Result<ProfileLease, StoreError> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Only the map holds an idle participant's lock.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(participant.to_owned()).or_default())
        };
        let guard = lock.lock_owned().await;

        let (profile, created) = match self.store.load(participant).await? {
            Some(profile) => (profile, false),
            None => (Profile::default(), true),
        };

        let lease = ProfileLease {
            participant: participant.to_owned(),
            profile,
            store: Arc::clone(&self.store),
            _guard: guard,
        };

        if created {
            lease.commit().await?;
            debug!(participant, "profile created");
        }

        Ok(lease)
    }
}

/// Exclusive, mutable access to one participant's profile.
///
/// Mutations stay in memory until [`ProfileLease::commit`] writes the full
/// snapshot through to the store.
pub struct ProfileLease {
    participant: String,
    profile: Profile,
    store: Arc<dyn ProfileStore>,
    _guard: OwnedMutexGuard<()>,
}

impl std::fmt::Debug for ProfileLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileLease")
            .field("participant", &self.participant)
            .field("stage", &self.profile.stage)
            .finish_non_exhaustive()
    }
}

impl ProfileLease {
    /// Participant identifier.
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// Current in-memory profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Mutable in-memory profile.
    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    /// Persist the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store write fails.
    pub async fn commit(&self) -> Result<(), StoreError> {
        self.store.save(&self.participant, &self.profile).await?;
        debug!(
            participant = %self.participant,
            stage = self.profile.stage.as_str(),
            history = self.profile.history.len(),
            "profile committed"
        );
        Ok(())
    }
}
