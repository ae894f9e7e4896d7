use std::future;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use lassi_core::relay::{Inbound, OrderRelay, drive, socket_pair};

use crate::api::extractors::KioskAuth;
use crate::state::AppState;

/// `GET /tunnel/ws` — the kiosk's own WebSocket.
///
/// The upgraded socket replaces whatever connection the relay held before
/// and immediately receives the backlog as `newOrder` frames.
pub(super) async fn kiosk_ws(
    State(state): State<AppState>,
    _kiosk: KioskAuth,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let relay = state.relay.clone();
    ws.on_upgrade(move |socket| handle_kiosk_ws(socket, relay))
}

async fn handle_kiosk_ws(socket: WebSocket, relay: OrderRelay) {
    let (handle, link) = socket_pair();
    let id = link.id();
    relay.register_connection(handle);
    tracing::info!(connection = %id, "Kiosk socket connected");

    let (writer, reader) = socket.split();
    let writer = writer.with(|frame: String| {
        future::ready(Ok::<_, axum::Error>(Message::Text(frame.into())))
    });
    let reader = reader.map(|message| message.map(inbound));

    drive(relay, link, reader, writer).await;
    tracing::info!(connection = %id, "Kiosk socket finished");
}

fn inbound(message: Message) -> Inbound {
    match message {
        Message::Text(text) => Inbound::Text(text.as_str().to_owned()),
        Message::Binary(data) => Inbound::Binary(data.len()),
        Message::Close(_) => Inbound::Close,
        Message::Ping(_) | Message::Pong(_) => Inbound::Control,
    }
}
