use crate::entities::PaymentMethod;
use crate::framework::DatabaseProcessor;
use compact_str::ToCompactString;
use kanau::processor::Processor;
use lassi_sdk::objects::{CartItem, OrderMessage, OrderView, PlaceOrderRequest};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

/// `orders.total_price` is `NUMERIC(10, 2)`.
const TOTAL_PRICE_SCALE: u32 = 2;
const MAX_TOTAL_PRICE_CENTS: i64 = 9_999_999_999;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub cart_items: Json<Vec<CartItem>>,
    pub datetime: time::OffsetDateTime,
    pub payment_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
    pub created_at: time::OffsetDateTime,
}

/// Reasons a checkout payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Phone number is required")]
    MissingPhone,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid quantity for item {0}")]
    InvalidQuantity(String),
    #[error("Invalid price for item {0}")]
    InvalidPrice(String),
    #[error("Total price cannot be negative")]
    NegativeTotal,
    #[error("Total price cannot exceed 99999999.99")]
    TotalTooLarge,
    #[error("Total price cannot have more than 2 decimal places")]
    TotalPrecision,
    #[error("Payment ID is required for online payment")]
    MissingPaymentId,
}

/// A validated order ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub cart_items: Vec<CartItem>,
    pub datetime: time::OffsetDateTime,
    pub payment_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
}

impl NewOrder {
    /// Validate a checkout payload for `user_id`.
    ///
    /// Name and phone are trimmed. A payment id is required for online
    /// payment and discarded for payment at the counter.
    pub fn validate(user_id: Uuid, request: PlaceOrderRequest) -> Result<Self, OrderValidationError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(OrderValidationError::MissingName);
        }
        let phone = request.phone.trim();
        if phone.is_empty() {
            return Err(OrderValidationError::MissingPhone);
        }
        if request.cart_items.is_empty() {
            return Err(OrderValidationError::EmptyCart);
        }
        for item in &request.cart_items {
            if item.quantity == 0 {
                return Err(OrderValidationError::InvalidQuantity(item.id.to_string()));
            }
            if item.price.is_sign_negative() {
                return Err(OrderValidationError::InvalidPrice(item.id.to_string()));
            }
        }
        if request.total_price.is_sign_negative() {
            return Err(OrderValidationError::NegativeTotal);
        }
        // Postgres would round the scale and fail the insert on overflow.
        if request.total_price > Decimal::new(MAX_TOTAL_PRICE_CENTS, TOTAL_PRICE_SCALE) {
            return Err(OrderValidationError::TotalTooLarge);
        }
        if request.total_price.normalize().scale() > TOTAL_PRICE_SCALE {
            return Err(OrderValidationError::TotalPrecision);
        }

        let payment_method = PaymentMethod::from(request.payment_method);
        let payment_id = match payment_method {
            PaymentMethod::Online => {
                let id = request
                    .payment_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or(OrderValidationError::MissingPaymentId)?;
                Some(id.to_owned())
            }
            PaymentMethod::Cafe => None,
        };

        Ok(Self {
            user_id,
            name: name.to_owned(),
            phone: phone.to_owned(),
            cart_items: request.cart_items,
            datetime: request.datetime,
            payment_id,
            payment_method,
            total_price: request.total_price,
        })
    }
}

const ORDER_COLUMNS: &str = "order_id, user_id, name, phone, cart_items, datetime, \
    payment_id, payment_method, total_price, created_at";

impl OrderRecord {
    /// Persist a validated order, assigning its id.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order: NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "INSERT INTO orders \
             (order_id, user_id, name, phone, cart_items, datetime, payment_id, payment_method, total_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(order.user_id)
        .bind(order.name)
        .bind(order.phone)
        .bind(Json(order.cart_items))
        .bind(order.datetime)
        .bind(order.payment_id)
        .bind(order.payment_method)
        .bind(order.total_price)
        .fetch_one(&mut **tx)
        .await
    }

    /// The message relayed to the kiosk.
    pub fn to_message(&self) -> OrderMessage {
        OrderMessage {
            order_id: self.order_id.to_compact_string(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            cart_items: self.cart_items.0.clone(),
            datetime: self.datetime,
            payment_id: self.payment_id.clone(),
            payment_method: self.payment_method.into(),
            total_price: self.total_price,
        }
    }

    pub fn to_view(&self) -> OrderView {
        OrderView {
            order_id: self.order_id.to_compact_string(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            cart_items: self.cart_items.0.clone(),
            datetime: self.datetime,
            payment_id: self.payment_id.clone(),
            payment_method: self.payment_method.into(),
            total_price: self.total_price,
            created_at: self.created_at,
        }
    }
}

/// A user's orders, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListOrdersForUser {
    pub user_id: Uuid,
}

impl Processor<ListOrdersForUser> for DatabaseProcessor {
    type Output = Vec<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListOrdersForUser")]
    async fn process(&self, query: ListOrdersForUser) -> Result<Vec<OrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(query.user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lassi_sdk::objects::PaymentMethod as SdkPaymentMethod;

    fn request(method: SdkPaymentMethod, payment_id: Option<&str>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            name: "  Ravi ".to_string(),
            phone: " 12345".to_string(),
            cart_items: vec![CartItem {
                id: "3".into(),
                title: "Salted Lassi".to_string(),
                quantity: 2,
                price: Decimal::from(40),
            }],
            datetime: time::macros::datetime!(2025-03-01 10:30 +5:30),
            payment_id: payment_id.map(str::to_owned),
            payment_method: method,
            total_price: Decimal::from(80),
        }
    }

    #[test]
    fn test_cafe_order_drops_payment_id() {
        let user_id = Uuid::now_v7();
        let order =
            NewOrder::validate(user_id, request(SdkPaymentMethod::Cafe, Some("pay_1"))).unwrap();
        assert_eq!(order.name, "Ravi");
        assert_eq!(order.phone, "12345");
        assert_eq!(order.payment_id, None);
        assert_eq!(order.payment_method, PaymentMethod::Cafe);
    }

    #[test]
    fn test_online_order_requires_payment_id() {
        let user_id = Uuid::now_v7();
        assert_eq!(
            NewOrder::validate(user_id, request(SdkPaymentMethod::Online, None)),
            Err(OrderValidationError::MissingPaymentId)
        );
        assert_eq!(
            NewOrder::validate(user_id, request(SdkPaymentMethod::Online, Some("  "))),
            Err(OrderValidationError::MissingPaymentId)
        );
        let order =
            NewOrder::validate(user_id, request(SdkPaymentMethod::Online, Some("upi-42"))).unwrap();
        assert_eq!(order.payment_id.as_deref(), Some("upi-42"));
    }

    #[test]
    fn test_rejects_bad_payloads() {
        let user_id = Uuid::now_v7();

        let mut empty_name = request(SdkPaymentMethod::Cafe, None);
        empty_name.name = "   ".to_string();
        assert_eq!(
            NewOrder::validate(user_id, empty_name),
            Err(OrderValidationError::MissingName)
        );

        let mut empty_cart = request(SdkPaymentMethod::Cafe, None);
        empty_cart.cart_items.clear();
        assert_eq!(
            NewOrder::validate(user_id, empty_cart),
            Err(OrderValidationError::EmptyCart)
        );

        let mut zero_quantity = request(SdkPaymentMethod::Cafe, None);
        zero_quantity.cart_items[0].quantity = 0;
        assert_eq!(
            NewOrder::validate(user_id, zero_quantity),
            Err(OrderValidationError::InvalidQuantity("3".to_string()))
        );

        let mut negative_total = request(SdkPaymentMethod::Cafe, None);
        negative_total.total_price = Decimal::from(-1);
        assert_eq!(
            NewOrder::validate(user_id, negative_total),
            Err(OrderValidationError::NegativeTotal)
        );
    }

    #[test]
    fn test_total_must_fit_stored_column() {
        let user_id = Uuid::now_v7();
        let with_total = |total: Decimal| {
            let mut payload = request(SdkPaymentMethod::Cafe, None);
            payload.total_price = total;
            NewOrder::validate(user_id, payload).map(|order| order.total_price)
        };

        assert_eq!(
            with_total(Decimal::new(10005, 3)),
            Err(OrderValidationError::TotalPrecision)
        );
        assert_eq!(
            with_total(Decimal::from(100_000_000)),
            Err(OrderValidationError::TotalTooLarge)
        );

        // Trailing zeros and the column maximum are accepted unchanged.
        assert_eq!(with_total(Decimal::new(80500, 3)), Ok(Decimal::new(80500, 3)));
        let max = Decimal::new(9_999_999_999, 2);
        assert_eq!(with_total(max), Ok(max));
    }

    #[test]
    fn test_record_to_message() {
        let record = OrderRecord {
            order_id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: "Ravi".to_string(),
            phone: "12345".to_string(),
            cart_items: Json(vec![]),
            datetime: time::OffsetDateTime::UNIX_EPOCH,
            payment_id: Some("upi-42".to_string()),
            payment_method: PaymentMethod::Online,
            total_price: Decimal::from(80),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        let message = record.to_message();
        assert_eq!(message.order_id, "00000000-0000-0000-0000-000000000000");
        assert_eq!(message.payment_method, SdkPaymentMethod::Online);
        assert_eq!(message.payment_id.as_deref(), Some("upi-42"));
    }
}
