pub mod accounts;
pub mod cart;
pub mod menu;
pub mod orders;
pub mod relay;

pub use accounts::{
    MessageResponse, ProfileResponse, SignInRequest, SignInResponse, SignUpRequest,
    UpdateProfileRequest, UserSummary,
};
pub use cart::{CartAddRequest, CartDetail, CartEntry, CartRemoveRequest, CartResponse};
pub use menu::FoodItem;
pub use orders::{
    CartItem, OrderListResponse, OrderMessage, OrderView, PaymentMethod, PlaceOrderRequest,
    PlaceOrderResponse,
};
pub use relay::{
    ConnectionStatus, NEW_ORDER_EVENT, RegisterTunnelRequest, RelayEnvelope, RelayStatus,
};

use serde::{Deserialize, Deserializer};

/// Error body returned by every failing endpoint: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Treat `""` and `null` as `None` for optional fields filled from HTML forms.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
