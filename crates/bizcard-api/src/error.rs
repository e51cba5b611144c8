use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use bizcard_types::api::ErrorBody;
use bizcard_types::models::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid card: {0}")]
    Validation(#[from] ValidationError),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("card limit reached; edit the existing card instead")]
    CardLimitReached { existing_card_id: Uuid },
    #[error("service unavailable")]
    Unavailable,
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::CardLimitReached { .. } => StatusCode::CONFLICT,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let existing_card_id = match &self {
            ApiError::CardLimitReached { existing_card_id } => Some(*existing_card_id),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            existing_card_id,
        };
        (self.status(), Json(body)).into_response()
    }
}
