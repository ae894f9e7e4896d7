//! Custom Axum extractors for request authentication and JSON bodies.
//!
//! Provides:
//! - `AuthUser` — resolves the `Authorization: Bearer <token>` session token
//!   to a stored user (storefront API).
//! - `KioskAuth` — checks the kiosk secret on the tunnel endpoints.
//! - `JsonBody<T>` — `axum::Json` with `{"error": ...}` rejections.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, rejection::JsonRejection},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use kanau::processor::Processor;
use lassi_core::entities::users::{GetUserById, UserRecord};
use lassi_sdk::KIOSK_SECRET_HEADER;
use serde::Deserialize;

use super::{error_response, internal_error};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// JsonBody — JSON request bodies with storefront-style errors
// ---------------------------------------------------------------------------

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonBodyError))]
pub struct JsonBody<T>(pub T);

pub struct JsonBodyError(JsonRejection);

impl From<JsonRejection> for JsonBodyError {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection)
    }
}

impl IntoResponse for JsonBodyError {
    fn into_response(self) -> Response {
        let status = match self.0.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        error_response(status, self.0.body_text())
    }
}

// ---------------------------------------------------------------------------
// AuthUser — bearer session token
// ---------------------------------------------------------------------------

/// The signed-in user behind a request.
pub struct AuthUser(pub UserRecord);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no bearer token")]
    MissingToken,
    #[error("invalid session token")]
    InvalidToken,
    #[error("user no longer exists")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingToken => {
                error_response(StatusCode::UNAUTHORIZED, "Unauthorized: No token provided")
            }
            AuthError::InvalidToken => {
                error_response(StatusCode::FORBIDDEN, "Invalid or expired token")
            }
            AuthError::UserNotFound => error_response(StatusCode::UNAUTHORIZED, "User not found"),
            AuthError::Database(e) => internal_error("Failed to load session user", &e),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let verified = state.config.auth.read().await.session.verify(token);
        let user_id = verified.map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AuthError::InvalidToken
        })?;

        let user = state
            .processor()
            .process(GetUserById { id: user_id })
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthUser(user))
    }
}

// ---------------------------------------------------------------------------
// KioskAuth — shared kiosk secret
// ---------------------------------------------------------------------------

/// Proof that the caller knows the kiosk secret.
///
/// The secret is read from the `Lassi-Kiosk-Secret` header. WebSocket clients
/// that cannot set headers may pass it as the `secret` query parameter.
pub struct KioskAuth;

#[derive(Debug, thiserror::Error)]
pub enum KioskAuthError {
    #[error("missing kiosk secret")]
    MissingSecret,
    #[error("kiosk secret rejected")]
    Rejected,
    #[error("secret verification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for KioskAuthError {
    fn into_response(self) -> Response {
        match self {
            KioskAuthError::MissingSecret => {
                error_response(StatusCode::UNAUTHORIZED, "Kiosk secret required")
            }
            KioskAuthError::Rejected => {
                error_response(StatusCode::FORBIDDEN, "Invalid kiosk secret")
            }
            KioskAuthError::Task(e) => internal_error("Kiosk secret verification failed", &e),
        }
    }
}

#[derive(Deserialize)]
struct KioskQuery {
    secret: Option<String>,
}

impl FromRequestParts<AppState> for KioskAuth {
    type Rejection = KioskAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(KIOSK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let secret = match from_header {
            Some(secret) => Some(secret),
            None => Query::<KioskQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.secret),
        }
        .filter(|secret| !secret.is_empty())
        .ok_or(KioskAuthError::MissingSecret)?;

        let kiosk = state.config.kiosk.read().await.clone();
        let accepted = tokio::task::spawn_blocking(move || kiosk.verify_secret(&secret)).await?;
        if !accepted {
            tracing::warn!("Rejected kiosk secret");
            return Err(KioskAuthError::Rejected);
        }
        Ok(KioskAuth)
    }
}
