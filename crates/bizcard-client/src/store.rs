use tracing::{error, info, warn};
use uuid::Uuid;

use bizcard_types::policy::{CreateDecision, can_create_card};
use bizcard_types::{BusinessCard, CardFields, ConnectionStatus, Session};

use crate::backend::CardBackend;
use crate::cache::LocalCardCache;
use crate::error::ClientError;
use crate::monitor::ConnectionMonitor;
use crate::notice::Notice;

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Stored on the server.
    Remote(BusinessCard),
    /// Server unreachable; stored in the local cache only.
    LocalOnly { card: BusinessCard, notice: Notice },
    /// Invalid card or refused by the server. Nothing was stored.
    Rejected { notice: Notice },
    /// Neither the server nor the local cache accepted the card.
    Failed { notice: Notice },
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Remote(_))
    }

    pub fn card(&self) -> Option<&BusinessCard> {
        match self {
            SaveOutcome::Remote(card) | SaveOutcome::LocalOnly { card, .. } => Some(card),
            _ => None,
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            SaveOutcome::Remote(_) => Notice::success("Card saved."),
            SaveOutcome::LocalOnly { notice, .. }
            | SaveOutcome::Rejected { notice }
            | SaveOutcome::Failed { notice } => notice.clone(),
        }
    }
}

/// Reads and writes cards against the backend, with the local cache as a
/// fallback when the backend cannot be reached.
pub struct CardStore<B> {
    backend: B,
    cache: LocalCardCache,
    status: ConnectionStatus,
}

impl<B: CardBackend> CardStore<B> {
    pub fn new(backend: B, cache: LocalCardCache) -> Self {
        Self {
            backend,
            cache,
            status: ConnectionStatus::Unknown,
        }
    }

    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Probe through `monitor` and adopt its verdict.
    pub async fn connect(&mut self, monitor: &ConnectionMonitor) -> ConnectionStatus {
        self.status = monitor.probe(&self.backend).await;
        self.status
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_local_only(&self) -> bool {
        self.status.is_local_only()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &LocalCardCache {
        &self.cache
    }

    /// Single save attempt. `false` means the server does not have the card;
    /// the notice from [`save_outcome`](Self::save_outcome) says why.
    pub async fn save(&self, card: &BusinessCard) -> bool {
        self.save_outcome(card).await.is_success()
    }

    pub async fn save_outcome(&self, card: &BusinessCard) -> SaveOutcome {
        let card = normalized(card);
        if let Err(e) = card.fields.validate() {
            return SaveOutcome::Rejected {
                notice: Notice::error(e.to_string()),
            };
        }

        let cause = if self.is_local_only() {
            ClientError::Offline
        } else {
            match self.backend.upsert_card(&card).await {
                Ok(saved) => {
                    info!("Card {} saved", saved.id);
                    self.cache_quietly(&saved).await;
                    return SaveOutcome::Remote(saved);
                }
                Err(e) if e.is_connectivity() => e,
                Err(e) => {
                    warn!("Server refused card {}: {}", card.id, e);
                    return SaveOutcome::Rejected {
                        notice: Notice::error(format!("Could not save card: {e}")),
                    };
                }
            }
        };

        warn!("Saving card {} locally: {}", card.id, cause);
        match self.cache.put(&card).await {
            Ok(()) => SaveOutcome::LocalOnly {
                card,
                notice: Notice::warning("Server unreachable. Your card was saved on this device only."),
            },
            Err(e) => {
                error!("Local save of card {} failed: {}", card.id, e);
                SaveOutcome::Failed {
                    notice: Notice::error(format!("Could not save card: {e}")),
                }
            }
        }
    }

    /// Remote-only save. No cache fallback.
    pub async fn persist_remote(&self, card: &BusinessCard) -> Result<BusinessCard, ClientError> {
        if self.is_local_only() {
            return Err(ClientError::Offline);
        }
        let card = normalized(card);
        card.fields.validate()?;

        let saved = self.backend.upsert_card(&card).await?;
        self.cache_quietly(&saved).await;
        Ok(saved)
    }

    /// Public view of a card, from the server or, when it is unreachable, the
    /// local cache.
    pub async fn load(&self, card_id: Uuid) -> Result<Option<BusinessCard>, ClientError> {
        if !self.is_local_only() {
            match self.backend.fetch_card(card_id).await {
                Ok(card) => return Ok(card),
                Err(e) if e.is_connectivity() => warn!("Loading card {} from cache: {}", card_id, e),
                Err(e) => return Err(e),
            }
        }
        Ok(self.cache.get(card_id).await?.map(|card| card.public_view()))
    }

    /// The session user's own card.
    pub async fn load_mine(&self, session: &Session) -> Result<Option<BusinessCard>, ClientError> {
        if !self.is_local_only() {
            match self.backend.fetch_my_card().await {
                Ok(Some(card)) => {
                    self.cache_quietly(&card).await;
                    return Ok(Some(card));
                }
                Ok(None) => return Ok(None),
                Err(e) if e.is_connectivity() => warn!("Loading card of {} from cache: {}", session.username, e),
                Err(e) => return Err(e),
            }
        }
        self.cache.find_by_owner(session.user_id).await
    }

    /// Create a new card for the session user. Accounts at their card limit
    /// get [`ClientError::CardLimitReached`] pointing at the card to edit.
    pub async fn create(&self, session: &Session, fields: CardFields) -> Result<SaveOutcome, ClientError> {
        let existing: Vec<Uuid> = self.load_mine(session).await?.map(|c| c.id).into_iter().collect();
        if let CreateDecision::Blocked { existing } = can_create_card(session.role, &existing) {
            info!("{} already has card {}", session.username, existing);
            return Err(ClientError::CardLimitReached { existing });
        }

        let card = BusinessCard::new(session.user_id, fields);
        Ok(self.save_outcome(&card).await)
    }

    async fn cache_quietly(&self, card: &BusinessCard) {
        if let Err(e) = self.cache.put(card).await {
            warn!("Could not cache card {}: {}", card.id, e);
        }
    }
}

fn normalized(card: &BusinessCard) -> BusinessCard {
    BusinessCard {
        fields: card.fields.clone().normalized(),
        ..card.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, card_for, session};
    use bizcard_types::{CardField, Role};

    fn store(backend: FakeBackend, dir: &tempfile::TempDir) -> CardStore<FakeBackend> {
        CardStore::new(backend, LocalCardCache::new(dir.path()))
    }

    #[tokio::test]
    async fn save_goes_to_server_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(FakeBackend::new(), &dir);
        let card = card_for(store.backend().owner, "Ada");

        assert!(store.save(&card).await);
        assert!(store.backend().stored(card.id).is_some());
        assert!(store.cache().get(card.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unreachable_server_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_offline(true);
        let store = store(backend, &dir);
        let card = card_for(store.backend().owner, "Ada");

        let outcome = store.save_outcome(&card).await;
        assert!(!outcome.is_success());
        assert!(matches!(outcome, SaveOutcome::LocalOnly { .. }));
        assert_eq!(store.cache().get(card.id).await.unwrap().unwrap().fields.name, "Ada");
    }

    #[tokio::test]
    async fn local_only_mode_skips_the_server() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_offline(true);
        let mut store = store(backend, &dir);
        let monitor = ConnectionMonitor::new();
        assert_eq!(store.connect(&monitor).await, ConnectionStatus::Disconnected);

        store.backend().set_offline(false);
        let card = card_for(store.backend().owner, "Ada");
        assert!(!store.save(&card).await);
        assert_eq!(store.backend().upserts(), 0);
        assert!(store.cache().get(card.id).await.unwrap().is_some());
        assert!(matches!(store.persist_remote(&card).await, Err(ClientError::Offline)));
    }

    #[tokio::test]
    async fn refused_save_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_reject_writes(true);
        let store = store(backend, &dir);
        let card = card_for(store.backend().owner, "Ada");

        let outcome = store.save_outcome(&card).await;
        assert!(matches!(outcome, SaveOutcome::Rejected { .. }));
        assert!(store.cache().get(card.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_card_is_rejected_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(FakeBackend::new(), &dir);
        let card = card_for(store.backend().owner, "   ");

        let outcome = store.save_outcome(&card).await;
        assert!(matches!(outcome, SaveOutcome::Rejected { .. }));
        assert_eq!(outcome.notice().level, crate::NoticeLevel::Error);
        assert_eq!(store.backend().upserts(), 0);
    }

    #[tokio::test]
    async fn load_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(FakeBackend::new(), &dir);
        let card = card_for(store.backend().owner, "Ada");
        assert!(store.save(&card).await);

        store.backend().set_offline(true);
        assert_eq!(store.load(card.id).await.unwrap().unwrap().id, card.id);
    }

    #[tokio::test]
    async fn cached_load_hides_invisible_fields() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new();
        backend.set_offline(true);
        let store = store(backend, &dir);

        let mut card = card_for(store.backend().owner, "Ada");
        card.fields.phone = Some("555 123 4567".into());
        card.fields.visible_fields.set(CardField::Phone, false);
        store.cache().put(&card).await.unwrap();

        let loaded = store.load(card.id).await.unwrap().unwrap();
        assert_eq!(loaded.fields.phone, None);
        assert_eq!(loaded.fields.name, "Ada");
    }

    #[tokio::test]
    async fn load_mine_uses_owner_scan_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        let me = session(Role::User);
        let store = store(FakeBackend::for_owner(me.user_id), &dir);
        let card = card_for(me.user_id, "Ada");
        store.backend().insert_card(card.clone());

        assert_eq!(store.load_mine(&me).await.unwrap().unwrap().id, card.id);
        store.backend().set_offline(true);
        assert_eq!(store.load_mine(&me).await.unwrap().unwrap().id, card.id);
    }

    #[tokio::test]
    async fn second_card_is_blocked_for_regular_users() {
        let dir = tempfile::tempdir().unwrap();
        let me = session(Role::User);
        let store = store(FakeBackend::for_owner(me.user_id), &dir);

        let first = store
            .create(&me, CardFields { name: "Ada".into(), ..Default::default() })
            .await
            .unwrap();
        let first_id = first.card().unwrap().id;

        let err = store
            .create(&me, CardFields { name: "Ada again".into(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::CardLimitReached { existing } if existing == first_id));
    }

    #[tokio::test]
    async fn superadmin_may_create_more() {
        let dir = tempfile::tempdir().unwrap();
        let me = session(Role::SuperAdmin);
        let store = store(FakeBackend::for_owner(me.user_id), &dir);

        for name in ["One", "Two", "Three"] {
            let outcome = store
                .create(&me, CardFields { name: name.into(), ..Default::default() })
                .await
                .unwrap();
            assert!(outcome.is_success());
        }
        assert_eq!(store.backend().upserts(), 3);
    }
}
