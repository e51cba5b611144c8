//! HTTP API for business cards: accounts, cards, QR codes and the admin
//! user table. `router` wires every handler; the server binary adds
//! transport layers (CORS, tracing) on top.

pub mod admin;
pub mod auth;
pub mod cards;
pub mod convert;
pub mod error;
pub mod health;
pub mod middleware;
pub mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/card/{card_id}", get(cards::get_public_card))
        .route("/card/{card_id}/qr.svg", get(cards::qr_svg))
        .route("/card/{card_id}/qr.png", get(cards::qr_png));

    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/me/card", get(cards::get_my_card))
        .route("/cards", post(cards::create_card))
        .route("/cards/{card_id}", put(cards::upsert_card))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{user_id}/role", put(admin::update_role))
        .route("/admin/export", get(admin::export_users))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
