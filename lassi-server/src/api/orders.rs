//! Checkout and order history endpoints.
//!
//! # Endpoints
//!
//! - `POST /users/orders/place` – persist an order and relay it to the kiosk
//! - `GET  /users/orders`       – `{orders: [...]}`, newest first
//! - `GET  /orders/my`          – the same list as a bare array

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kanau::processor::Processor;
use lassi_core::entities::carts::CartLine;
use lassi_core::entities::orders::{ListOrdersForUser, NewOrder, OrderRecord, OrderValidationError};
use lassi_sdk::objects::{OrderListResponse, OrderView, PlaceOrderRequest, PlaceOrderResponse};
use uuid::Uuid;

use super::extractors::{AuthUser, JsonBody};
use super::{error_response, internal_error};
use crate::state::AppState;

/// Routes nested under `/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/place", post(place_order))
}

#[derive(Debug, thiserror::Error)]
pub enum OrdersError {
    #[error(transparent)]
    Invalid(#[from] OrderValidationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for OrdersError {
    fn into_response(self) -> Response {
        match self {
            OrdersError::Invalid(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
            OrdersError::Database(e) => internal_error("Order query failed", &e),
        }
    }
}

async fn place_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(body): JsonBody<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, OrdersError> {
    let order = NewOrder::validate(user.id, body)?;

    let mut tx = state.db.begin().await?;
    let record = OrderRecord::insert_tx(&mut tx, order).await?;
    CartLine::clear_tx(&mut tx, user.id).await?;
    tx.commit().await?;

    let message = record.to_message();
    let order_id = message.order_id.clone();
    let outcome = state.relay.submit(message);
    tracing::debug!(%order_id, user_id = %user.id, ?outcome, "Order placed");

    Ok(Json(PlaceOrderResponse {
        message: "Order placed successfully".to_string(),
        order_id,
    }))
}

async fn load_orders(state: &AppState, user_id: Uuid) -> Result<Vec<OrderView>, OrdersError> {
    let records = state
        .processor()
        .process(ListOrdersForUser { user_id })
        .await?;
    Ok(records.iter().map(OrderRecord::to_view).collect())
}

async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<OrderListResponse>, OrdersError> {
    Ok(Json(OrderListResponse {
        orders: load_orders(&state, user.id).await?,
    }))
}

/// `GET /orders/my`
pub async fn my_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<OrderView>>, OrdersError> {
    Ok(Json(load_orders(&state, user.id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let response = OrdersError::from(OrderValidationError::MissingPaymentId).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Payment ID is required for online payment");
    }
}
