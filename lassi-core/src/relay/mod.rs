//! Order relay to the kiosk.
//!
//! The relay holds at most one kiosk connection and a FIFO buffer of orders
//! that could not be handed to it. Orders submitted while no ready
//! connection exists are buffered and flushed, oldest first, as soon as a
//! connection is registered ready or reports its ready transition.
//!
//! All state sits behind a single mutex and no operation awaits while
//! holding it. Sends are fire-and-forget: a connection accepts a frame into
//! its writer queue and the socket driver writes it. Flushing therefore runs
//! to completion inside one critical section and can never interleave with
//! another flush. Replacing a connection takes back whatever is still in its
//! queue before the successor sees any order.

pub mod connection;
pub mod driver;
pub mod tunnel;

pub use connection::{
    ConnectionId, ConnectionState, RelayConnection, SendError, SocketHandle, SocketLink,
    encode_frame, socket_pair,
};
pub use driver::{Inbound, drive};
pub use tunnel::{TunnelError, connect_tunnel, parse_tunnel_url};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lassi_sdk::objects::{ConnectionStatus, OrderMessage, RelayStatus};

/// What happened to a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Handed to the kiosk connection.
    Sent,
    /// Waiting in the buffer; `pending` includes this order.
    Queued { pending: usize },
}

/// Cloneable handle to the relay shared by every request handler.
#[derive(Clone, Default)]
pub struct OrderRelay {
    inner: Arc<Mutex<RelayState>>,
}

#[derive(Default)]
struct RelayState {
    current: Option<Arc<dyn RelayConnection>>,
    pending: VecDeque<OrderMessage>,
}

impl RelayState {
    fn current_is(&self, id: ConnectionId) -> bool {
        self.current.as_ref().is_some_and(|conn| conn.id() == id)
    }

    /// Send buffered orders while the current connection is ready, stopping at
    /// the first failure with the failed order back at the front.
    fn flush(&mut self) -> usize {
        let Some(conn) = self.current.as_deref() else {
            return 0;
        };
        let mut sent = 0;
        while conn.state() == ConnectionState::Ready {
            let Some(order) = self.pending.pop_front() else {
                break;
            };
            match conn.send(&order) {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!(
                        connection = %conn.id(),
                        order_id = %order.order_id,
                        error = %e,
                        "failed to send order to kiosk, keeping it buffered"
                    );
                    self.pending.push_front(order);
                    break;
                }
            }
        }
        if sent > 0 {
            tracing::info!(
                connection = %conn.id(),
                sent,
                remaining = self.pending.len(),
                "flushed buffered orders to kiosk"
            );
        }
        sent
    }

    fn requeue_front(&mut self, undelivered: Vec<OrderMessage>) {
        for order in undelivered.into_iter().rev() {
            self.pending.push_front(order);
        }
    }
}

impl OrderRelay {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand a persisted order to the kiosk, or buffer it.
    ///
    /// Never fails: transport problems leave the order in the buffer.
    pub fn submit(&self, order: OrderMessage) -> SubmitOutcome {
        let order_id = order.order_id.clone();
        let mut state = self.lock();
        state.pending.push_back(order);
        state.flush();

        if state.pending.is_empty() {
            tracing::info!(%order_id, "order relayed to kiosk");
            SubmitOutcome::Sent
        } else {
            let pending = state.pending.len();
            tracing::info!(%order_id, pending, "kiosk unavailable, order buffered");
            SubmitOutcome::Queued { pending }
        }
    }

    /// Make `conn` the kiosk connection, terminating the previous one.
    ///
    /// Buffered orders are flushed right away if `conn` is already ready,
    /// otherwise on its ready report.
    pub fn register_connection(&self, conn: Arc<dyn RelayConnection>) {
        let mut state = self.lock();
        if let Some(old) = state.current.take() {
            // Orders the old socket never started writing keep their place
            // ahead of anything the new connection will receive.
            let reclaimed = old.terminate();
            tracing::info!(
                old = %old.id(),
                new = %conn.id(),
                reclaimed = reclaimed.len(),
                "replacing kiosk connection"
            );
            state.requeue_front(reclaimed);
        }
        tracing::info!(connection = %conn.id(), state = ?conn.state(), "kiosk connection registered");
        state.current = Some(conn);
        state.flush();
    }

    /// The connection `id` can now accept writes.
    pub fn connection_ready(&self, id: ConnectionId) {
        let mut state = self.lock();
        if !state.current_is(id) {
            tracing::debug!(connection = %id, "ignoring ready report from stale connection");
            return;
        }
        tracing::info!(connection = %id, "kiosk connection ready");
        state.flush();
    }

    /// The connection `id` closed. `undelivered` are orders it accepted but
    /// never wrote; they go back to the front of the buffer.
    pub fn connection_closed(&self, id: ConnectionId, undelivered: Vec<OrderMessage>) {
        let mut state = self.lock();
        state.requeue_front(undelivered);
        if state.current_is(id) {
            state.current = None;
            tracing::info!(connection = %id, pending = state.pending.len(), "kiosk connection closed");
        } else {
            tracing::debug!(connection = %id, "stale kiosk connection closed");
            state.flush();
        }
    }

    /// The connection `id` failed. Handled like a close.
    pub fn connection_failed(&self, id: ConnectionId, reason: &str, undelivered: Vec<OrderMessage>) {
        let mut state = self.lock();
        state.requeue_front(undelivered);
        if state.current_is(id) {
            state.current = None;
            tracing::warn!(connection = %id, %reason, pending = state.pending.len(), "kiosk connection failed");
        } else {
            tracing::debug!(connection = %id, %reason, "stale kiosk connection failed");
            state.flush();
        }
    }

    /// Drain the buffer to the current connection if it is ready.
    pub fn flush(&self) -> usize {
        self.lock().flush()
    }

    pub fn status(&self) -> RelayStatus {
        let state = self.lock();
        let connection_state = match state.current.as_ref().map(|conn| conn.state()) {
            Some(ConnectionState::Ready) => ConnectionStatus::Ready,
            Some(ConnectionState::Opening) => ConnectionStatus::Opening,
            Some(ConnectionState::Closed) | None => ConnectionStatus::Disconnected,
        };
        RelayStatus {
            connected: connection_state == ConnectionStatus::Ready,
            connection_state,
            pending_orders: state.pending.len(),
        }
    }
}
