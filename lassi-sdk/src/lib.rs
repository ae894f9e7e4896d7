//! Shared API objects for the Lassi Corner ordering backend.
//!
//! The `objects` module holds every request, response and wire type spoken
//! by the server. Enabling the `client` feature adds typed clients for the
//! storefront REST API and the kiosk order socket.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod objects;

#[cfg(feature = "client")]
pub mod client;

/// Header carrying the plaintext kiosk secret on tunnel endpoints.
pub const KIOSK_SECRET_HEADER: &str = "Lassi-Kiosk-Secret";
