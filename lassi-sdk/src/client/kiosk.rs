//! Kiosk listener client (desktop kiosk ← Lassi Corner server).

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::ClientError;
use crate::KIOSK_SECRET_HEADER;
use crate::objects::{OrderMessage, RelayEnvelope};

/// Receives relayed orders over the server's `GET /tunnel/ws` socket.
///
/// ```no_run
/// # async fn run() -> Result<(), lassi_sdk::client::ClientError> {
/// let url = url::Url::parse("wss://orders.example.com/tunnel/ws")?;
/// let mut kiosk = lassi_sdk::client::KioskClient::connect(&url, "kiosk-secret").await?;
/// while let Some(order) = kiosk.next_order().await? {
///     println!("{} ordered {} items", order.name, order.cart_items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct KioskClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl KioskClient {
    /// Open the kiosk socket, authenticating with the plaintext kiosk secret.
    pub async fn connect(url: &Url, secret: &str) -> Result<Self, ClientError> {
        let mut request = url.as_str().into_client_request()?;
        let secret = HeaderValue::from_str(secret).map_err(|_| ClientError::InvalidSecret)?;
        request.headers_mut().insert(KIOSK_SECRET_HEADER, secret);

        let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
        Ok(Self { stream })
    }

    /// Wait for the next relayed order.
    ///
    /// Frames carrying other events are skipped. Returns `Ok(None)` once the
    /// server closes the socket.
    pub async fn next_order(&mut self) -> Result<Option<OrderMessage>, ClientError> {
        while let Some(message) = self.stream.next().await {
            let text = match message? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(None),
                _ => continue,
            };
            let envelope: RelayEnvelope<serde_json::Value> = serde_json::from_str(&text)?;
            if let Some(order) = envelope.into_order()? {
                return Ok(Some(order));
            }
        }
        Ok(None)
    }

    /// Close the socket gracefully.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
