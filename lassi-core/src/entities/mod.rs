pub mod carts;
pub mod food_items;
pub mod orders;
pub mod users;

use lassi_sdk::objects::PaymentMethod as SdkPaymentMethod;

/// Payment method for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `lassi_sdk::objects::PaymentMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "payment_method")]
pub enum PaymentMethod {
    Online,
    Cafe,
}

impl From<PaymentMethod> for SdkPaymentMethod {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Online => SdkPaymentMethod::Online,
            PaymentMethod::Cafe => SdkPaymentMethod::Cafe,
        }
    }
}

impl From<SdkPaymentMethod> for PaymentMethod {
    fn from(value: SdkPaymentMethod) -> Self {
        match value {
            SdkPaymentMethod::Online => PaymentMethod::Online,
            SdkPaymentMethod::Cafe => PaymentMethod::Cafe,
        }
    }
}
