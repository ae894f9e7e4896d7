//! Socket driver shared by the outbound tunnel and the inbound kiosk socket.
//!
//! The driver owns both halves of a WebSocket. It is the only place that
//! awaits socket I/O, which keeps every relay operation synchronous.

use std::fmt;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use lassi_sdk::objects::OrderMessage;
use tokio_tungstenite::tungstenite::Message;

use super::OrderRelay;
use super::connection::{Outbound, SocketLink};

/// Transport-neutral view of an incoming WebSocket message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(usize),
    /// Ping, pong or raw frame; answered by the transport itself.
    Control,
    Close,
}

impl From<Message> for Inbound {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Inbound::Text(text),
            Message::Binary(data) => Inbound::Binary(data.len()),
            Message::Close(_) => Inbound::Close,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Control,
        }
    }
}

/// Drive one registered socket until it closes, fails, or is superseded.
///
/// Marks the connection ready, writes queued frames in order and logs
/// whatever the kiosk sends. On exit, every frame that never reached the
/// socket is handed back to the relay together with the lifecycle report.
pub async fn drive<R, W, E>(relay: OrderRelay, mut link: SocketLink, mut reader: R, mut writer: W)
where
    R: Stream<Item = Result<Inbound, E>> + Unpin,
    W: Sink<String> + Unpin,
    W::Error: fmt::Display,
    E: fmt::Display,
{
    let id = link.id();
    if link.mark_ready() {
        relay.connection_ready(id);
    }

    let mut unwritten: Option<OrderMessage> = None;
    let failure: Option<String> = loop {
        tokio::select! {
            biased;

            next = link.next_outbound() => {
                let Some(Outbound { order, frame }) = next else {
                    tracing::debug!(connection = %id, "kiosk socket closed by relay");
                    break None;
                };
                if let Err(e) = writer.send(frame).await {
                    unwritten = Some(order);
                    break Some(e.to_string());
                }
                tracing::debug!(connection = %id, order_id = %order.order_id, "order written to kiosk socket");
            }

            incoming = reader.next() => {
                match incoming {
                    Some(Ok(Inbound::Text(text))) => {
                        tracing::info!(connection = %id, message = %text, "message from kiosk");
                    }
                    Some(Ok(Inbound::Binary(len))) => {
                        tracing::debug!(connection = %id, len, "ignoring binary frame from kiosk");
                    }
                    Some(Ok(Inbound::Control)) => {}
                    Some(Ok(Inbound::Close)) | None => break None,
                    Some(Err(e)) => break Some(e.to_string()),
                }
            }
        }
    };

    let mut undelivered: Vec<OrderMessage> = unwritten.into_iter().collect();
    undelivered.extend(link.close_and_drain());

    match failure {
        None => relay.connection_closed(id, undelivered),
        Some(reason) => relay.connection_failed(id, &reason, undelivered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::connection::socket_pair;
    use crate::relay::tests::{pending_ids, sample_order};
    use lassi_sdk::objects::ConnectionStatus;
    use std::io;
    use std::pin::Pin;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    type TestSink = Pin<Box<dyn Sink<String, Error = io::Error> + Send>>;

    fn channel_sink(tx: mpsc::UnboundedSender<String>) -> TestSink {
        Box::pin(futures_util::sink::unfold(
            tx,
            |tx, frame: String| async move {
                tx.send(frame)
                    .map_err(|_| io::Error::other("receiver dropped"))?;
                Ok::<_, io::Error>(tx)
            },
        ))
    }

    fn broken_sink() -> TestSink {
        Box::pin(futures_util::sink::unfold((), |(), _frame: String| async {
            Err::<(), _>(io::Error::other("broken pipe"))
        }))
    }

    async fn recv_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
        let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_driver_flushes_backlog_then_live_orders() {
        let relay = OrderRelay::new();
        relay.submit(sample_order("A1"));

        let (handle, link) = socket_pair();
        relay.register_connection(handle);

        let (in_tx, in_rx) = mpsc::unbounded_channel::<Result<Inbound, io::Error>>();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(
            relay.clone(),
            link,
            UnboundedReceiverStream::new(in_rx),
            channel_sink(out_tx),
        ));

        let first = recv_frame(&mut out_rx).await;
        assert_eq!(first["event"], "newOrder");
        assert_eq!(first["data"]["orderId"], "A1");

        relay.submit(sample_order("A2"));
        let second = recv_frame(&mut out_rx).await;
        assert_eq!(second["data"]["orderId"], "A2");

        in_tx.send(Ok(Inbound::Close)).unwrap();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();

        let status = relay.status();
        assert!(!status.connected);
        assert_eq!(status.connection_state, ConnectionStatus::Disconnected);
        assert!(pending_ids(&relay).is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_returns_order_to_buffer() {
        let relay = OrderRelay::new();
        relay.submit(sample_order("A1"));
        relay.submit(sample_order("A2"));

        let (handle, link) = socket_pair();
        relay.register_connection(handle);

        let (_in_tx, in_rx) = mpsc::unbounded_channel::<Result<Inbound, io::Error>>();
        let task = tokio::spawn(drive(
            relay.clone(),
            link,
            UnboundedReceiverStream::new(in_rx),
            broken_sink(),
        ));
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(pending_ids(&relay), ["A1", "A2"]);
        assert_eq!(
            relay.status().connection_state,
            ConnectionStatus::Disconnected
        );
    }

    #[tokio::test]
    async fn test_superseded_driver_does_not_clear_successor() {
        let relay = OrderRelay::new();

        let (first, first_link) = socket_pair();
        relay.register_connection(first);
        let (_in_tx, in_rx) = mpsc::unbounded_channel::<Result<Inbound, io::Error>>();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let first_task = tokio::spawn(drive(
            relay.clone(),
            first_link,
            UnboundedReceiverStream::new(in_rx),
            channel_sink(out_tx),
        ));

        let (second, _second_link) = socket_pair();
        relay.register_connection(second);

        tokio::time::timeout(Duration::from_secs(2), first_task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(relay.status().connection_state, ConnectionStatus::Opening);
    }
}
