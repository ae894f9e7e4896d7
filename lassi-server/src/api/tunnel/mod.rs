//! Kiosk tunnel endpoints.
//!
//! # Endpoints
//!
//! - `POST /tunnel/register` – dial a kiosk's `wss` tunnel URL (kiosk secret)
//! - `GET  /tunnel/ws`       – kiosk opens its own socket (kiosk secret)
//! - `GET  /tunnel/status`   – relay connection state and backlog (public)

mod ws;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use lassi_core::relay::{TunnelError, connect_tunnel};
use lassi_sdk::objects::{MessageResponse, RegisterTunnelRequest, RelayStatus};

use super::error_response;
use super::extractors::{JsonBody, KioskAuth};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_tunnel))
        .route("/ws", get(ws::kiosk_ws))
        .route("/status", get(relay_status))
}

pub struct RegisterError(TunnelError);

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        if self.0.is_invalid_request() {
            return error_response(StatusCode::BAD_REQUEST, self.0.to_string());
        }
        tracing::error!(error = %self.0, "Failed to connect to kiosk tunnel");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to connect to tunnel",
        )
    }
}

async fn register_tunnel(
    State(state): State<AppState>,
    _kiosk: KioskAuth,
    JsonBody(body): JsonBody<RegisterTunnelRequest>,
) -> Result<Json<MessageResponse>, RegisterError> {
    let id = connect_tunnel(&state.relay, &body.ws_url)
        .await
        .map_err(RegisterError)?;
    tracing::info!(connection = %id, "Kiosk tunnel registered");
    Ok(Json(MessageResponse::new("Tunnel registered")))
}

async fn relay_status(State(state): State<AppState>) -> Json<RelayStatus> {
    Json(state.relay.status())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_error_status() {
        let response = RegisterError(TunnelError::InsecureScheme("ws".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            RegisterError(TunnelError::Timeout("kiosk.example.com".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
