use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use bizcard_types::Session;
use bizcard_types::api::Claims;

use crate::convert::role_from_row;
use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// Validate the bearer token and attach a [`Session`] built from the current
/// database record, so role changes take effect on the next request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(&state.jwt_secret, token)?;

    let user_id = claims.sub;
    let user = run_db(&state, move |db| db.get_user_by_id(&user_id.to_string()))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let session = Session {
        user_id,
        username: user.username,
        role: role_from_row(&user.role, &user.id),
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

/// Handlers behind the admin views call this first.
pub fn require_admin(session: &Session) -> Result<(), ApiError> {
    if session.is_admin() { Ok(()) } else { Err(ApiError::Forbidden) }
}

pub fn require_super_admin(session: &Session) -> Result<(), ApiError> {
    if session.is_super_admin() { Ok(()) } else { Err(ApiError::Forbidden) }
}

/// Card edits are open to the owner and to admins.
pub fn can_edit_card(session: &Session, owner: Uuid) -> bool {
    session.user_id == owner || session.is_admin()
}
