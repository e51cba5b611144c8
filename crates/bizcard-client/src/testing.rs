//! In-memory stand-ins for the backend and the platform share targets.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use uuid::Uuid;

use bizcard_types::{BusinessCard, CardFields, Role, Session, UserWithRole};

use crate::backend::CardBackend;
use crate::error::ClientError;
use crate::share::{Clipboard, NativeShare, ShareError};

pub fn session(role: Role) -> Session {
    Session {
        user_id: Uuid::new_v4(),
        username: format!("{role}-account"),
        role,
    }
}

pub fn card_for(owner: Uuid, name: &str) -> BusinessCard {
    BusinessCard::new(
        owner,
        CardFields {
            name: name.into(),
            ..Default::default()
        },
    )
}

/// Backend signed in as `owner`. Flip `offline` to simulate an unreachable
/// server, `reject_writes` to simulate a 403.
pub struct FakeBackend {
    pub owner: Uuid,
    cards: Mutex<HashMap<Uuid, BusinessCard>>,
    users: Mutex<Vec<UserWithRole>>,
    offline: AtomicBool,
    reject_writes: AtomicBool,
    health_calls: AtomicUsize,
    upserts: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::for_owner(Uuid::new_v4())
    }

    pub fn for_owner(owner: Uuid) -> Self {
        Self {
            owner,
            cards: Mutex::new(HashMap::new()),
            users: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            health_calls: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn insert_card(&self, card: BusinessCard) {
        self.cards.lock().unwrap().insert(card.id, card);
    }

    pub fn stored(&self, card_id: Uuid) -> Option<BusinessCard> {
        self.cards.lock().unwrap().get(&card_id).cloned()
    }

    pub fn add_user(&self, username: &str, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().push(UserWithRole {
            id,
            username: username.into(),
            role,
            cards: Vec::new(),
            updated_at: Utc::now(),
        });
        id
    }

    fn reachable(&self) -> Result<(), ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ClientError::Offline)
        } else {
            Ok(())
        }
    }
}

impl CardBackend for FakeBackend {
    async fn health(&self) -> Result<(), ClientError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable()
    }

    async fn fetch_card(&self, card_id: Uuid) -> Result<Option<BusinessCard>, ClientError> {
        self.reachable()?;
        Ok(self.stored(card_id).map(|c| c.public_view()))
    }

    async fn fetch_my_card(&self) -> Result<Option<BusinessCard>, ClientError> {
        self.reachable()?;
        let cards = self.cards.lock().unwrap();
        Ok(cards
            .values()
            .filter(|c| c.user_id == self.owner)
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn upsert_card(&self, card: &BusinessCard) -> Result<BusinessCard, ClientError> {
        self.reachable()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Forbidden);
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut stored = card.clone();
        stored.updated_at = Utc::now();
        self.insert_card(stored.clone());
        Ok(stored)
    }

    async fn list_users(&self) -> Result<Vec<UserWithRole>, ClientError> {
        self.reachable()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<(), ClientError> {
        self.reachable()?;
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == user_id).ok_or(ClientError::NotFound)?;
        user.role = role;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingShare {
    pub shared: Mutex<Vec<String>>,
    pub fail: bool,
}

impl NativeShare for RecordingShare {
    fn share(&self, _title: &str, url: &str) -> Result<(), ShareError> {
        if self.fail {
            return Err(ShareError::Native("share sheet dismissed".into()));
        }
        self.shared.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    pub copied: Mutex<Vec<String>>,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&self, text: &str) -> Result<(), ShareError> {
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
