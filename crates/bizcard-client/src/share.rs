use thiserror::Error;
use tracing::{info, warn};

use bizcard_types::BusinessCard;

use crate::backend::CardBackend;
use crate::error::ClientError;
use crate::notice::Notice;
use crate::store::CardStore;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("card could not be saved before sharing: {0}")]
    NotPersisted(ClientError),
    #[error("share failed: {0}")]
    Native(String),
    #[error("could not copy link: {0}")]
    Clipboard(String),
}

impl ShareError {
    pub fn notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}

/// Platform share sheet, where one exists.
pub trait NativeShare: Send + Sync {
    fn share(&self, title: &str, url: &str) -> Result<(), ShareError>;
}

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ShareError>;
}

/// Desktop clipboard through `arboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ShareError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ShareError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ShareError::Clipboard(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMethod {
    Native,
    Clipboard,
}

impl ShareMethod {
    pub fn notice(self) -> Notice {
        match self {
            ShareMethod::Native => Notice::success("Card shared."),
            ShareMethod::Clipboard => Notice::success("Link copied to clipboard."),
        }
    }
}

pub struct ShareFlow<'a> {
    native: Option<&'a dyn NativeShare>,
    clipboard: &'a dyn Clipboard,
}

impl<'a> ShareFlow<'a> {
    pub fn new(clipboard: &'a dyn Clipboard) -> Self {
        Self {
            native: None,
            clipboard,
        }
    }

    pub fn with_native(mut self, native: &'a dyn NativeShare) -> Self {
        self.native = Some(native);
        self
    }

    /// Save `card` on the server, then hand `url` to the share sheet or the
    /// clipboard. A card that is not on the server is never shared.
    pub async fn share<B: CardBackend>(
        &self,
        store: &CardStore<B>,
        card: &BusinessCard,
        url: &str,
    ) -> Result<ShareMethod, ShareError> {
        if let Err(e) = store.persist_remote(card).await {
            warn!("Not sharing card {}: {}", card.id, e);
            return Err(ShareError::NotPersisted(e));
        }

        let method = match self.native {
            Some(native) => {
                native.share(&card.fields.name, url)?;
                ShareMethod::Native
            }
            None => {
                self.clipboard.set_text(url)?;
                ShareMethod::Clipboard
            }
        };
        info!("Shared card {} via {:?}", card.id, method);
        Ok(method)
    }

    /// [`share`](Self::share), reduced to the notice the UI shows.
    pub async fn share_with_notice<B: CardBackend>(&self, store: &CardStore<B>, card: &BusinessCard, url: &str) -> Notice {
        match self.share(store, card, url).await {
            Ok(method) => method.notice(),
            Err(e) => e.notice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCardCache;
    use crate::testing::{FakeBackend, RecordingClipboard, RecordingShare, card_for};
    use crate::NoticeLevel;

    const URL: &str = "https://cards.example/card/1";

    fn store(backend: FakeBackend, dir: &tempfile::TempDir) -> CardStore<FakeBackend> {
        CardStore::new(backend, LocalCardCache::new(dir.path()))
    }

    #[tokio::test]
    async fn saves_then_copies_without_native_share() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(FakeBackend::new(), &dir);
        let card = card_for(store.backend().owner, "Ada");
        let clipboard = RecordingClipboard::default();

        let method = ShareFlow::new(&clipboard).share(&store, &card, URL).await.unwrap();
        assert_eq!(method, ShareMethod::Clipboard);
        assert_eq!(*clipboard.copied.lock().unwrap(), vec![URL.to_string()]);
        assert!(store.backend().stored(card.id).is_some());
    }

    #[tokio::test]
    async fn prefers_native_share() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(FakeBackend::new(), &dir);
        let card = card_for(store.backend().owner, "Ada");
        let clipboard = RecordingClipboard::default();
        let native = RecordingShare::default();

        let flow = ShareFlow::new(&clipboard).with_native(&native);
        assert_eq!(flow.share(&store, &card, URL).await.unwrap(), ShareMethod::Native);
        assert_eq!(native.shared.lock().unwrap().len(), 1);
        assert!(clipboard.copied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsaved_card_is_not_shared() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_offline(true);
        let store = store(backend, &dir);
        let card = card_for(store.backend().owner, "Ada");
        let clipboard = RecordingClipboard::default();
        let native = RecordingShare::default();

        let flow = ShareFlow::new(&clipboard).with_native(&native);
        let err = flow.share(&store, &card, URL).await.unwrap_err();
        assert!(matches!(err, ShareError::NotPersisted(_)));
        assert!(native.shared.lock().unwrap().is_empty());
        assert!(clipboard.copied.lock().unwrap().is_empty());

        let notice = flow.share_with_notice(&store, &card, URL).await;
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn native_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(FakeBackend::new(), &dir);
        let card = card_for(store.backend().owner, "Ada");
        let clipboard = RecordingClipboard::default();
        let native = RecordingShare {
            fail: true,
            ..Default::default()
        };

        let err = ShareFlow::new(&clipboard)
            .with_native(&native)
            .share(&store, &card, URL)
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Native(_)));
        assert!(clipboard.copied.lock().unwrap().is_empty());
    }
}
