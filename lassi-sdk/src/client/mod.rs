//! Clients for the Lassi Corner APIs.
//!
//! Gated behind the `client` cargo feature so crates that only need the
//! shared types do not pull in `reqwest` and `tokio-tungstenite`.

mod kiosk;
mod storefront;

pub use kiosk::KioskClient;
pub use storefront::StorefrontClient;

use reqwest::StatusCode;

/// Errors produced by the SDK clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The kiosk socket failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// A body or frame could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// An authenticated call was made before signing in.
    #[error("not signed in")]
    NotSignedIn,

    /// The kiosk secret is not a valid header value.
    #[error("invalid kiosk secret")]
    InvalidSecret,
}
