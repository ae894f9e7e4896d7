use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A menu entry as listed by `GET /fooditems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub fid: i32,
    pub fname: String,
    pub category: i32,
    /// Category display name; `None` when the category row is missing.
    pub catname: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    pub active: bool,
    #[serde(rename = "is_on")]
    pub is_on: bool,
    pub veg: bool,
    #[serde(rename = "depend_inv")]
    pub depend_inv: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}
