//! Outbound connection to a kiosk tunnel URL.

use std::future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

use super::connection::{ConnectionId, socket_pair};
use super::driver::{Inbound, drive};
use super::OrderRelay;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("invalid tunnel url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("tunnel url must use wss, got {0}")]
    InsecureScheme(String),
    #[error("tunnel url has no host")]
    MissingHost,
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("websocket handshake failed: {0}")]
    Handshake(#[from] tungstenite::Error),
    #[error("timed out connecting to {0}")]
    Timeout(String),
}

impl TunnelError {
    /// Whether the caller supplied an unusable URL, as opposed to the tunnel
    /// being unreachable.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            TunnelError::InvalidUrl(_) | TunnelError::InsecureScheme(_) | TunnelError::MissingHost
        )
    }
}

/// Parse a tunnel URL, accepting only `wss` URLs with a host.
pub fn parse_tunnel_url(raw: &str) -> Result<Url, TunnelError> {
    let url = Url::parse(raw.trim())?;
    if url.scheme() != "wss" {
        return Err(TunnelError::InsecureScheme(url.scheme().to_owned()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(TunnelError::MissingHost);
    }
    Ok(url)
}

/// Connect to a kiosk tunnel and register the socket with the relay.
///
/// The host is resolved and dialed directly; the TLS handshake uses the URL
/// host for SNI and the `Host` header. Returns once the socket is registered;
/// a background task drives it from then on.
pub async fn connect_tunnel(relay: &OrderRelay, raw_url: &str) -> Result<ConnectionId, TunnelError> {
    let url = parse_tunnel_url(raw_url)?;
    let host = url.host_str().ok_or(TunnelError::MissingHost)?.to_owned();
    let port = url.port_or_known_default().unwrap_or(443);

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|source| TunnelError::Resolve {
            host: host.clone(),
            source,
        })?
        .collect();
    tracing::debug!(%host, ?addrs, "resolved kiosk tunnel host");

    let tcp = dial(&host, &addrs).await?;
    let (stream, _response) = tokio::time::timeout(
        HANDSHAKE_TIMEOUT,
        tokio_tungstenite::client_async_tls(url.as_str(), tcp),
    )
    .await
    .map_err(|_| TunnelError::Timeout(host.clone()))??;

    let (handle, link) = socket_pair();
    let id = link.id();
    relay.register_connection(handle);
    tracing::info!(connection = %id, %host, "kiosk tunnel connected");

    let (writer, reader) = stream.split();
    let writer = writer.with(|frame: String| {
        future::ready(Ok::<_, tungstenite::Error>(Message::Text(frame)))
    });
    let reader = reader.map(|message| message.map(Inbound::from));
    tokio::spawn(drive(relay.clone(), link, reader, writer));

    Ok(id)
}

async fn dial(host: &str, addrs: &[SocketAddr]) -> Result<TcpStream, TunnelError> {
    let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no addresses resolved");
    for addr in addrs {
        match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(tcp)) => return Ok(tcp),
            Ok(Err(e)) => {
                tracing::debug!(%addr, error = %e, "kiosk tunnel address unreachable");
                last_error = e;
            }
            Err(_) => {
                last_error = io::Error::new(io::ErrorKind::TimedOut, "connect timed out");
            }
        }
    }
    Err(TunnelError::Connect {
        host: host.to_owned(),
        source: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_wss_is_accepted() {
        assert!(parse_tunnel_url("wss://kiosk.example.com/orders").is_ok());
        assert!(matches!(
            parse_tunnel_url("ws://kiosk.example.com"),
            Err(TunnelError::InsecureScheme(scheme)) if scheme == "ws"
        ));
        assert!(matches!(
            parse_tunnel_url("https://kiosk.example.com"),
            Err(TunnelError::InsecureScheme(_))
        ));
        assert!(matches!(
            parse_tunnel_url("not a url"),
            Err(TunnelError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_request_errors_are_distinguished() {
        assert!(TunnelError::InsecureScheme("ws".into()).is_invalid_request());
        assert!(!TunnelError::Timeout("kiosk.example.com".into()).is_invalid_request());
    }

    #[tokio::test]
    async fn test_invalid_url_leaves_relay_untouched() {
        let relay = OrderRelay::new();
        let err = connect_tunnel(&relay, "ws://127.0.0.1:9").await.unwrap_err();
        assert!(err.is_invalid_request());
        assert!(!relay.status().connected);
    }
}
