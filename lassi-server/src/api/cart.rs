//! Cart endpoints. Every route requires a signed-in user.
//!
//! # Endpoints
//!
//! - `GET  /users/cart`         – the cart as `{fid, quantity}` lines
//! - `POST /users/cart/add`     – set the quantity of a menu item
//! - `POST /users/cart/remove`  – lower the quantity or drop the line
//! - `GET  /users/cart/details` – cart lines joined with the menu

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kanau::processor::Processor;
use lassi_core::entities::carts::{GetCart, GetCartDetails, RemoveCartLine, SetCartQuantity};
use lassi_core::entities::food_items::GetFoodItem;
use lassi_core::framework::DatabaseProcessor;
use lassi_sdk::objects::{CartAddRequest, CartDetail, CartEntry, CartRemoveRequest, CartResponse};
use uuid::Uuid;

use super::extractors::{AuthUser, JsonBody};
use super::{error_response, internal_error};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/remove", post(remove_from_cart))
        .route("/cart/details", get(cart_details))
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("food item {0} not found")]
    UnknownItem(i32),
    #[error("food item {0} is not available")]
    Unavailable(i32),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        match self {
            CartError::InvalidQuantity => {
                error_response(StatusCode::BAD_REQUEST, "Quantity must be at least 1")
            }
            CartError::UnknownItem(_) => {
                error_response(StatusCode::NOT_FOUND, "Food item not found")
            }
            CartError::Unavailable(_) => {
                error_response(StatusCode::BAD_REQUEST, "Food item is not available")
            }
            CartError::Database(e) => internal_error("Cart query failed", &e),
        }
    }
}

async fn load_cart(processor: &DatabaseProcessor, user_id: Uuid) -> Result<CartResponse, CartError> {
    let lines = processor.process(GetCart { user_id }).await?;
    Ok(CartResponse {
        cart: lines.into_iter().map(CartEntry::from).collect(),
    })
}

async fn get_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CartResponse>, CartError> {
    Ok(Json(load_cart(&state.processor(), user.id).await?))
}

async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(body): JsonBody<CartAddRequest>,
) -> Result<Json<CartResponse>, CartError> {
    if body.quantity < 1 {
        return Err(CartError::InvalidQuantity);
    }

    let processor = state.processor();
    let item = processor
        .process(GetFoodItem { fid: body.fid })
        .await?
        .ok_or(CartError::UnknownItem(body.fid))?;
    if !item.is_orderable() {
        return Err(CartError::Unavailable(body.fid));
    }

    processor
        .process(SetCartQuantity {
            user_id: user.id,
            fid: body.fid,
            quantity: body.quantity,
        })
        .await?;

    Ok(Json(load_cart(&processor, user.id).await?))
}

async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(body): JsonBody<CartRemoveRequest>,
) -> Result<Json<CartResponse>, CartError> {
    let processor = state.processor();
    match body.quantity.filter(|quantity| *quantity > 0) {
        Some(quantity) => {
            processor
                .process(GetFoodItem { fid: body.fid })
                .await?
                .ok_or(CartError::UnknownItem(body.fid))?;
            processor
                .process(SetCartQuantity {
                    user_id: user.id,
                    fid: body.fid,
                    quantity,
                })
                .await?;
        }
        None => {
            processor
                .process(RemoveCartLine {
                    user_id: user.id,
                    fid: body.fid,
                })
                .await?;
        }
    }

    Ok(Json(load_cart(&processor, user.id).await?))
}

async fn cart_details(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CartDetail>>, CartError> {
    let rows = state
        .processor()
        .process(GetCartDetails { user_id: user.id })
        .await?;
    Ok(Json(rows.into_iter().map(CartDetail::from).collect()))
}
