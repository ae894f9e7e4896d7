//! Public menu endpoint.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use kanau::processor::Processor;
use lassi_core::entities::food_items::ListFoodItems;
use lassi_sdk::objects::FoodItem;

use super::internal_error;
use crate::state::AppState;

pub struct MenuError(sqlx::Error);

impl IntoResponse for MenuError {
    fn into_response(self) -> Response {
        internal_error("Failed to list food items", &self.0)
    }
}

/// `GET /fooditems` – every food item, active or not.
pub async fn list_food_items(State(state): State<AppState>) -> Result<Json<Vec<FoodItem>>, MenuError> {
    let items = state
        .processor()
        .process(ListFoodItems)
        .await
        .map_err(MenuError)?;
    Ok(Json(items.into_iter().map(FoodItem::from).collect()))
}
