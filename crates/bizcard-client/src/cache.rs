use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use bizcard_types::BusinessCard;

use crate::error::ClientError;

/// Flat fallback store: one `<card-id>.json` file per card. No versioning,
/// no merge; the last write wins.
#[derive(Debug, Clone)]
pub struct LocalCardCache {
    dir: PathBuf,
}

impl LocalCardCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, card_id: Uuid) -> PathBuf {
        self.dir.join(format!("{card_id}.json"))
    }

    pub async fn get(&self, card_id: Uuid) -> Result<Option<BusinessCard>, ClientError> {
        match fs::read(self.path_for(card_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn put(&self, card: &BusinessCard) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(card)?;
        fs::write(self.path_for(card.id), bytes).await?;
        debug!("Cached card {} locally", card.id);
        Ok(())
    }

    /// Oldest cached card owned by `user_id`. Unreadable entries are skipped.
    pub async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<BusinessCard>, ClientError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut found: Option<BusinessCard> = None;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let card: BusinessCard = match fs::read(&path).await.map_err(ClientError::from).and_then(|bytes| {
                serde_json::from_slice(&bytes).map_err(ClientError::from)
            }) {
                Ok(card) => card,
                Err(e) => {
                    warn!("Skipping unreadable cache entry {}: {}", path.display(), e);
                    continue;
                }
            };

            if card.user_id == user_id && found.as_ref().is_none_or(|f| card.created_at < f.created_at) {
                found = Some(card);
            }
        }
        Ok(found)
    }
}
