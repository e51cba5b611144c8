use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use bizcard_types::Session;
use bizcard_types::api::{Claims, LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse};

use crate::convert::role_from_row;
use crate::error::ApiError;
use crate::state::{AppState, run_db};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_LIFETIME_DAYS: i64 = 30;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim().to_string();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username.chars().count()) {
        return Err(ApiError::BadRequest(format!(
            "username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"
        )));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let lookup = username.clone();
    if run_db(&state, move |db| db.get_user_by_username(&lookup))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("username is taken".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    let user_id = Uuid::new_v4();
    let name = username.clone();
    // A concurrent registration can take the name between the check above and here.
    if !run_db(&state, move |db| db.create_user(&user_id.to_string(), &name, &password_hash)).await? {
        return Err(ApiError::Conflict("username is taken".into()));
    }

    let token = create_token(&state.jwt_secret, user_id, &username).map_err(|e| {
        error!("Token creation failed: {}", e);
        ApiError::Internal
    })?;

    info!("Registered user {} ({})", username, user_id);
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lookup = req.username.trim().to_string();
    let user = run_db(&state, move |db| db.get_user_by_username(&lookup))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|_| ApiError::Internal)?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user.id.parse().map_err(|_| ApiError::Internal)?;
    let role = role_from_row(&user.role, &user.id);

    let token = create_token(&state.jwt_secret, user_id, &user.username).map_err(|e| {
        error!("Token creation failed: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        role,
        token,
    }))
}

/// GET /me: the caller's session and the capabilities its role grants.
pub async fn me(Extension(session): Extension<Session>) -> Json<MeResponse> {
    let capabilities = session.capabilities();
    Json(MeResponse { session, capabilities })
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
