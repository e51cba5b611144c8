use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use bizcard_db::InsertOutcome;
use bizcard_types::url::card_share_url;
use bizcard_types::{BusinessCard, CardFields, Session};

use crate::convert::{card_from_row, card_to_row};
use crate::error::ApiError;
use crate::middleware::can_edit_card;
use crate::state::{AppState, run_db};

pub const QR_DEFAULT_SIZE: u32 = 512;
pub const QR_MIN_SIZE: u32 = 64;
pub const QR_MAX_SIZE: u32 = 2048;

#[derive(Debug, Deserialize)]
pub struct QrQuery {
    pub size: Option<u32>,
}

async fn load_card(state: &AppState, card_id: Uuid) -> Result<Option<BusinessCard>, ApiError> {
    run_db(state, move |db| db.get_card(&card_id.to_string()))
        .await?
        .map(card_from_row)
        .transpose()
}

/// GET /card/{card_id}: public view, hidden fields removed.
pub async fn get_public_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<BusinessCard>, ApiError> {
    let card = load_card(&state, card_id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(card.public_view()))
}

/// GET /me/card: the caller's first card, or `null`.
pub async fn get_my_card(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Option<BusinessCard>>, ApiError> {
    let uid = session.user_id.to_string();
    let rows = run_db(&state, move |db| db.get_cards_for_user(&uid)).await?;
    let card = rows.into_iter().next().map(card_from_row).transpose()?;
    Ok(Json(card))
}

/// POST /cards: create a card under a fresh id. Subject to the card limit.
pub async fn create_card(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(fields): Json<CardFields>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = checked_fields(fields)?;
    let card = insert_card(&state, &session, Uuid::new_v4(), fields).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT /cards/{card_id}: update when the card exists, otherwise create it
/// under the given id (card limit applies).
pub async fn upsert_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Extension(session): Extension<Session>,
    Json(fields): Json<CardFields>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = checked_fields(fields)?;

    let Some(mut card) = load_card(&state, card_id).await? else {
        let card = insert_card(&state, &session, card_id, fields).await?;
        return Ok((StatusCode::CREATED, Json(card)));
    };

    if !can_edit_card(&session, card.user_id) {
        return Err(ApiError::Forbidden);
    }

    card.fields = fields;
    card.updated_at = chrono::Utc::now();
    let row = card_to_row(&card)?;
    if !run_db(&state, move |db| db.update_card(&row)).await? {
        return Err(ApiError::NotFound);
    }

    info!("Card {} updated by {}", card.id, session.username);
    Ok((StatusCode::OK, Json(card)))
}

fn checked_fields(fields: CardFields) -> Result<CardFields, ApiError> {
    let fields = fields.normalized();
    fields.validate()?;
    Ok(fields)
}

async fn insert_card(
    state: &AppState,
    session: &Session,
    card_id: Uuid,
    fields: CardFields,
) -> Result<BusinessCard, ApiError> {
    let mut card = BusinessCard::new(session.user_id, fields);
    card.id = card_id;

    let row = card_to_row(&card)?;
    let limit = session.role.card_limit();
    match run_db(state, move |db| db.insert_card_checked(&row, limit)).await? {
        InsertOutcome::Inserted => {
            info!("Card {} created by {}", card.id, session.username);
            Ok(card)
        }
        InsertOutcome::LimitReached { existing_id } => {
            info!("Card limit reached for {}, existing card {}", session.username, existing_id);
            let existing_card_id = existing_id.parse().map_err(|e| {
                error!("Corrupt card id '{}': {}", existing_id, e);
                ApiError::Internal
            })?;
            Err(ApiError::CardLimitReached { existing_card_id })
        }
    }
}

/// GET /card/{card_id}/qr.svg: QR code of the share URL.
pub async fn qr_svg(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Query(query): Query<QrQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let qr = card_qr(&state, card_id, query.size).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], qr.svg().to_string()))
}

/// GET /card/{card_id}/qr.png: same code rasterized on a white canvas.
pub async fn qr_png(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Query(query): Query<QrQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let size = clamp_qr_size(query.size);
    let qr = card_qr(&state, card_id, Some(size)).await?;
    let png = qr.to_png(size.max(qr.min_raster_size())).map_err(|e| {
        error!("QR rasterization failed for card {}: {}", card_id, e);
        ApiError::Internal
    })?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

fn clamp_qr_size(size: Option<u32>) -> u32 {
    size.unwrap_or(QR_DEFAULT_SIZE).clamp(QR_MIN_SIZE, QR_MAX_SIZE)
}

async fn card_qr(state: &AppState, card_id: Uuid, size: Option<u32>) -> Result<bizcard_qr::QrImage, ApiError> {
    if load_card(state, card_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let url = card_share_url(&state.public_origin, card_id);
    bizcard_qr::render(&url, clamp_qr_size(size)).map_err(|e| {
        error!("QR render failed for {}: {}", url, e);
        ApiError::Internal
    })
}
