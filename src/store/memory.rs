//! Process-local profile store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::profile::Profile;

use super::{ProfileStore, StoreError};

/// Profiles kept in a map; lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load(&self, participant: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(participant).cloned())
    }

    async fn save(&self, participant: &str, profile: &Profile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(participant.to_owned(), profile.clone());
        Ok(())
    }

    async fn participants(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.profiles.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
