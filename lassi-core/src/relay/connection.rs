//! Connection handles the relay can hold.
//!
//! The relay only sees [`RelayConnection`]. Real sockets are represented by a
//! [`SocketHandle`] (held by the relay) paired with a [`SocketLink`] (owned by
//! the task driving the socket, see [`super::driver`]). Both halves share one
//! outbox, so the relay can take back unwritten orders the moment it drops a
//! connection.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lassi_sdk::objects::{OrderMessage, RelayEnvelope};
use tokio::sync::Notify;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a connection.
///
/// Lifecycle reports carry this id so a superseded connection can never
/// clear its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kiosk#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Registered, but the transport cannot accept writes yet.
    Opening = 0,
    Ready = 1,
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Opening,
            1 => ConnectionState::Ready,
            _ => ConnectionState::Closed,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("connection is not ready")]
    NotReady,
    #[error("connection writer has stopped")]
    WriterGone,
    #[error("failed to encode order: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A downstream connection as seen by the relay.
///
/// Implementations must not call back into the relay from any of these
/// methods; they run while the relay lock is held.
pub trait RelayConnection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn state(&self) -> ConnectionState;

    /// Hand one order to the transport without waiting for delivery.
    fn send(&self, order: &OrderMessage) -> Result<(), SendError>;

    /// Close the transport immediately and return the orders it accepted but
    /// has not started writing, oldest first. Must be idempotent; later calls
    /// return nothing.
    fn terminate(&self) -> Vec<OrderMessage>;
}

/// Encode an order as the `newOrder` text frame.
pub fn encode_frame(order: &OrderMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RelayEnvelope::new_order(order))
}

/// A frame queued for the socket writer, together with the order it carries
/// so it can be handed back to the relay if it never reaches the socket.
#[derive(Debug)]
pub struct Outbound {
    pub order: OrderMessage,
    pub frame: String,
}

#[derive(Debug, Default)]
struct Outbox {
    queue: VecDeque<Outbound>,
    closed: bool,
}

impl Outbox {
    /// Close the outbox and take everything still queued.
    fn close_and_take(&mut self) -> Vec<OrderMessage> {
        self.closed = true;
        self.queue.drain(..).map(|pending| pending.order).collect()
    }
}

/// State shared by a handle and its link.
#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    outbox: Mutex<Outbox>,
    wake: Notify,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) -> Vec<OrderMessage> {
        self.state
            .store(ConnectionState::Closed as u8, Ordering::Release);
        let unwritten = self.outbox().close_and_take();
        self.wake.notify_one();
        unwritten
    }
}

/// Relay-side half of a socket connection.
#[derive(Debug)]
pub struct SocketHandle {
    id: ConnectionId,
    shared: Arc<Shared>,
}

/// Driver-side half of a socket connection.
#[derive(Debug)]
pub struct SocketLink {
    id: ConnectionId,
    shared: Arc<Shared>,
}

/// Create a connected handle/link pair in the `Opening` state.
pub fn socket_pair() -> (Arc<SocketHandle>, SocketLink) {
    let id = ConnectionId::next();
    let shared = Arc::new(Shared {
        state: AtomicU8::new(ConnectionState::Opening as u8),
        outbox: Mutex::new(Outbox::default()),
        wake: Notify::new(),
    });
    let handle = Arc::new(SocketHandle {
        id,
        shared: shared.clone(),
    });
    (handle, SocketLink { id, shared })
}

impl RelayConnection for SocketHandle {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    fn send(&self, order: &OrderMessage) -> Result<(), SendError> {
        if self.state() != ConnectionState::Ready {
            return Err(SendError::NotReady);
        }
        let frame = encode_frame(order)?;
        {
            let mut outbox = self.shared.outbox();
            if outbox.closed {
                return Err(SendError::WriterGone);
            }
            outbox.queue.push_back(Outbound {
                order: order.clone(),
                frame,
            });
        }
        self.shared.wake.notify_one();
        Ok(())
    }

    fn terminate(&self) -> Vec<OrderMessage> {
        self.shared.close()
    }
}

impl SocketLink {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Move `Opening` to `Ready`. A terminated connection stays `Closed`.
    pub fn mark_ready(&self) -> bool {
        self.shared
            .state
            .compare_exchange(
                ConnectionState::Opening as u8,
                ConnectionState::Ready as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Wait for the next queued frame. Returns `None` once the connection is
    /// closed; frames still queued at that point belong to whoever closed it.
    pub(crate) async fn next_outbound(&self) -> Option<Outbound> {
        loop {
            {
                let mut outbox = self.shared.outbox();
                if outbox.closed {
                    return None;
                }
                if let Some(next) = outbox.queue.pop_front() {
                    return Some(next);
                }
            }
            self.shared.wake.notified().await;
        }
    }

    /// Mark the connection closed and collect every frame that was queued but
    /// never written, oldest first.
    pub fn close_and_drain(&mut self) -> Vec<OrderMessage> {
        self.shared.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::tests::sample_order;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_send_requires_ready() {
        let (handle, link) = socket_pair();
        assert!(matches!(
            handle.send(&sample_order("A1")),
            Err(SendError::NotReady)
        ));
        assert!(link.mark_ready());
        assert!(handle.send(&sample_order("A1")).is_ok());
    }

    #[test]
    fn test_terminate_wins_over_ready() {
        let (handle, link) = socket_pair();
        assert!(handle.terminate().is_empty());
        assert!(!link.mark_ready());
        assert_eq!(handle.state(), ConnectionState::Closed);
        assert_eq!(link.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_terminate_takes_back_queued_orders() {
        let (handle, mut link) = socket_pair();
        link.mark_ready();
        handle.send(&sample_order("A1")).unwrap();
        handle.send(&sample_order("A2")).unwrap();

        let unwritten = handle.terminate();
        let ids: Vec<_> = unwritten.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2"]);

        // The driver sees a closed link with nothing left to write.
        assert!(link.next_outbound().await.is_none());
        assert!(link.close_and_drain().is_empty());
        assert!(handle.terminate().is_empty());
    }

    #[tokio::test]
    async fn test_next_outbound_wakes_on_send() {
        let (handle, link) = socket_pair();
        link.mark_ready();

        let waiter = tokio::spawn(async move { link.next_outbound().await.map(|o| o.order) });
        tokio::task::yield_now().await;
        handle.send(&sample_order("A1")).unwrap();

        let order = tokio::time::timeout(std::time::Duration::from_secs(2), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(order.order_id, "A1");
    }

    #[test]
    fn test_close_and_drain_returns_unwritten_orders() {
        let (handle, mut link) = socket_pair();
        link.mark_ready();
        handle.send(&sample_order("A1")).unwrap();
        handle.send(&sample_order("A2")).unwrap();

        let undelivered = link.close_and_drain();
        let ids: Vec<_> = undelivered.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2"]);
        assert!(matches!(
            handle.send(&sample_order("A3")),
            Err(SendError::NotReady)
        ));
    }

    #[test]
    fn test_frame_is_new_order_envelope() {
        let frame = encode_frame(&sample_order("A1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "newOrder");
        assert_eq!(value["data"]["orderId"], "A1");
    }
}
