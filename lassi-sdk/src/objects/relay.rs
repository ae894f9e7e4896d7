//! Kiosk relay wire types.
//!
//! Every frame the server pushes to the kiosk is a JSON text frame shaped as
//! an event envelope:
//!
//! ```json
//! {"event":"newOrder","data":{"orderId":"...","name":"...", ...}}
//! ```

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::orders::OrderMessage;

/// Event name of a relayed order.
pub const NEW_ORDER_EVENT: &str = "newOrder";

/// Event-tagged frame exchanged with the kiosk.
///
/// The server serializes a borrowed payload (`RelayEnvelope<&OrderMessage>`);
/// clients decode into `RelayEnvelope<serde_json::Value>` first so unknown
/// events can be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayEnvelope<T> {
    pub event: CompactString,
    pub data: T,
}

impl<'a> RelayEnvelope<&'a OrderMessage> {
    /// Wrap an order as a `newOrder` event.
    pub fn new_order(order: &'a OrderMessage) -> Self {
        Self {
            event: CompactString::const_new(NEW_ORDER_EVENT),
            data: order,
        }
    }
}

impl RelayEnvelope<serde_json::Value> {
    /// Decode the payload as an order if this is a `newOrder` event.
    ///
    /// Returns `Ok(None)` for any other event.
    pub fn into_order(self) -> Result<Option<OrderMessage>, serde_json::Error> {
        if self.event != NEW_ORDER_EVENT {
            return Ok(None);
        }
        serde_json::from_value(self.data).map(Some)
    }
}

/// Lifecycle state of the kiosk connection as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No kiosk connection is registered.
    Disconnected,
    /// A connection is registered but cannot accept writes yet.
    Opening,
    /// A connection is registered and accepting writes.
    Ready,
}

/// `GET /tunnel/status` response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    /// Whether orders are currently delivered straight to the kiosk.
    pub connected: bool,
    pub connection_state: ConnectionStatus,
    /// Orders waiting for the kiosk.
    pub pending_orders: usize,
}

/// `POST /tunnel/register` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTunnelRequest {
    pub ws_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_event_is_skipped() {
        let envelope: RelayEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"event":"ping","data":{}}"#).unwrap();
        assert_eq!(envelope.into_order().unwrap(), None);
    }

    #[test]
    fn test_register_request_uses_camel_case() {
        let req: RegisterTunnelRequest =
            serde_json::from_str(r#"{"wsUrl":"wss://kiosk.example.com"}"#).unwrap();
        assert_eq!(req.ws_url, "wss://kiosk.example.com");
    }

    #[test]
    fn test_status_serialization() {
        let status = RelayStatus {
            connected: false,
            connection_state: ConnectionStatus::Disconnected,
            pending_orders: 3,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(
            json,
            r#"{"connected":false,"connectionState":"disconnected","pendingOrders":3}"#
        );
    }
}
