//! HTTP API handlers.
//!
//! # Route map
//!
//! - `GET  /fooditems`            – menu ([`menu`])
//! - `/users/...`                 – accounts, cart and orders
//! - `GET  /orders/my`            – order history as a bare array
//! - `/tunnel/...`                – kiosk registration, socket and status

pub mod accounts;
pub mod cart;
pub mod extractors;
pub mod menu;
pub mod orders;
pub mod tunnel;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lassi_sdk::objects::ErrorResponse;

use crate::state::AppState;

/// Routes nested under `/users`.
pub fn users_router() -> Router<AppState> {
    Router::new()
        .merge(accounts::router())
        .merge(cart::router())
        .merge(orders::router())
}

/// Build a `{"error": "..."}` response.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Log an unexpected failure and answer with a generic 500.
pub(crate) fn internal_error(context: &'static str, error: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %error, "{context}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
