//! Cart request and response types.
//!
//! Cart quantities are absolute: the menu page sends the new quantity of a
//! line rather than a delta.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line: a menu item id and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub fid: i32,
    pub quantity: i32,
}

/// Body of `GET /users/cart` and of both cart mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart: Vec<CartEntry>,
}

/// `POST /users/cart/add` request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAddRequest {
    pub fid: i32,
    pub quantity: i32,
}

/// `POST /users/cart/remove` request body.
///
/// A positive `quantity` keeps the line with that quantity; zero or a
/// missing quantity removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRemoveRequest {
    pub fid: i32,
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// A cart line joined with its menu entry (`GET /users/cart/details`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartDetail {
    pub fid: i32,
    pub fname: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    pub veg: bool,
    pub quantity: i32,
}
