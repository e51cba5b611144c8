use axum::{
    Extension, Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use bizcard_types::api::{UpdateRoleRequest, UpdateRoleResponse};
use bizcard_types::{Session, UserWithRole};

use crate::convert::users_with_cards;
use crate::error::ApiError;
use crate::middleware::{require_admin, require_super_admin};
use crate::state::{AppState, run_db};

async fn load_user_table(state: &AppState) -> Result<Vec<UserWithRole>, ApiError> {
    let (users, cards) = run_db(state, |db| Ok((db.list_users()?, db.list_card_summaries()?))).await?;
    users_with_cards(users, cards)
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<UserWithRole>>, ApiError> {
    require_admin(&session)?;
    Ok(Json(load_user_table(&state).await?))
}

/// PUT /admin/users/{user_id}/role
pub async fn update_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(session): Extension<Session>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UpdateRoleResponse>, ApiError> {
    require_super_admin(&session)?;

    if user_id == session.user_id {
        return Err(ApiError::BadRequest("cannot change your own role".into()));
    }

    let role = req.role;
    let updated = run_db(&state, move |db| db.set_user_role(&user_id.to_string(), role.as_str())).await?;
    if !updated {
        return Err(ApiError::NotFound);
    }

    info!("{} set role of {} to {}", session.username, user_id, role);
    Ok(Json(UpdateRoleResponse { user_id, role }))
}

/// GET /admin/export: the user table as a JSON attachment.
pub async fn export_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&session)?;

    let rows = load_user_table(&state).await?;
    let body = serde_json::to_vec_pretty(&rows).map_err(|e| {
        error!("Export encoding failed: {}", e);
        ApiError::Internal
    })?;

    let disposition = format!(
        "attachment; filename=\"users-{}.json\"",
        chrono::Utc::now().format("%Y%m%d")
    );

    info!("{} exported {} users", session.username, rows.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
