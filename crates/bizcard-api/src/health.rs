use axum::{Json, extract::State};
use tracing::warn;

use bizcard_types::api::HealthResponse;

use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// GET /health: reports `ok` once the database answers a trivial query.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    run_db(&state, |db| db.ping()).await.map_err(|e| {
        warn!("Health check failed: {}", e);
        ApiError::Unavailable
    })?;

    Ok(Json(HealthResponse {
        status: "ok".into(),
    }))
}
