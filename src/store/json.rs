//! Single-document JSON profile store.
//!
//! Layout on disk: `{"users": {"<participant>": { ...profile... }}}`. The
//! whole document is rewritten on every save through a temp file and rename,
//! so a crash mid-write leaves the previous version intact.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::profile::Profile;

use super::{ProfileStore, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: BTreeMap<String, Profile>,
}

/// Profiles kept in one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<Document>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing or empty file starts an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => Document::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "profile file not found, starting empty");
                Document::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    async fn flush(&self, document: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            warn!(error = %e, path = %self.path.display(), "failed to replace profile file");
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load(&self, participant: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.document.lock().await.users.get(participant).cloned())
    }

    async fn save(&self, participant: &str, profile: &Profile) -> Result<(), StoreError> {
        let mut document = self.document.lock().await;
        let previous = document
            .users
            .insert(participant.to_owned(), profile.clone());
        if let Err(e) = self.flush(&document).await {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => document.users.insert(participant.to_owned(), old),
                None => document.users.remove(participant),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn participants(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.document.lock().await.users.keys().cloned().collect())
    }
}
