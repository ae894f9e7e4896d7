//! Order placement types and the order message moved through the relay.

use compact_str::{CompactString, ToCompactString};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid up front by UPI; carries a payment reference.
    Online,
    /// Paid at the counter.
    Cafe,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Online => write!(f, "online"),
            PaymentMethod::Cafe => write!(f, "cafe"),
        }
    }
}

/// A single line of a placed order.
///
/// Accepts the menu field names (`fid`, `fname`, `cost`) as aliases so the
/// checkout page can post cart details unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(alias = "fid", alias = "_id", deserialize_with = "string_or_number")]
    pub id: CompactString,
    #[serde(alias = "fname")]
    pub title: String,
    pub quantity: u32,
    #[serde(alias = "cost", with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// The unit delivered to the kiosk.
///
/// Built once from a persisted order and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMessage {
    pub order_id: CompactString,
    pub name: String,
    pub phone: String,
    pub cart_items: Vec<CartItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub payment_id: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// `POST /users/orders/place` request body, as sent by the checkout page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub name: String,
    pub phone: String,
    pub cart_items: Vec<CartItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// `POST /users/orders/place` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: CompactString,
}

/// An order as shown in the customer's order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: CompactString,
    pub name: String,
    pub phone: String,
    pub cart_items: Vec<CartItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub payment_id: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// `GET /users/orders` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderView>,
}

/// Menu item ids are numeric in the menu but opaque strings on orders.
fn string_or_number<'de, D>(deserializer: D) -> Result<CompactString, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(CompactString),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_compact_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_message_wire_shape() {
        let order = OrderMessage {
            order_id: "A1".into(),
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            cart_items: vec![CartItem {
                id: "12".into(),
                title: "Mango Lassi".to_string(),
                quantity: 2,
                price: Decimal::from(50),
            }],
            datetime: time::macros::datetime!(2025-03-01 10:30 +5:30),
            payment_id: None,
            payment_method: PaymentMethod::Cafe,
            total_price: Decimal::from(100),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["orderId"], "A1");
        assert_eq!(value["paymentMethod"], "cafe");
        assert_eq!(value["paymentId"], serde_json::Value::Null);
        assert_eq!(value["totalPrice"], 100.0);
        assert_eq!(value["cartItems"][0]["price"], 50.0);
        assert_eq!(value["cartItems"][0]["quantity"], 2);
        assert_eq!(value["datetime"], "2025-03-01T10:30:00+05:30");
    }

    #[test]
    fn test_cart_item_accepts_menu_field_names() {
        let json = r#"{"fid": 7, "fname": "Sweet Lassi", "quantity": 1, "cost": 45.5, "veg": true}"#;
        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "7");
        assert_eq!(item.title, "Sweet Lassi");
        assert_eq!(item.price, Decimal::new(455, 1));
    }

    #[test]
    fn test_place_order_request_from_checkout_payload() {
        let json = r#"{
            "name": "Ravi",
            "phone": "12345",
            "cartItems": [{"id": "3", "title": "Salted Lassi", "quantity": 1, "price": 40}],
            "datetime": "2025-03-01T10:30:00+05:30",
            "paymentId": null,
            "paymentMethod": "online",
            "totalPrice": 40
        }"#;
        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.payment_method, PaymentMethod::Online);
        assert_eq!(req.payment_id, None);
        assert_eq!(req.total_price, Decimal::from(40));
    }
}
