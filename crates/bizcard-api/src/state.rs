use std::sync::Arc;

use bizcard_db::Database;
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Origin that public share URLs are built on, e.g. `https://cards.example`.
    pub public_origin: String,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>, public_origin: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            jwt_secret: jwt_secret.into(),
            public_origin: public_origin.into(),
        })
    }
}

/// Run a database call on the blocking pool.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("DB error: {}", e);
            ApiError::Internal
        })
}
