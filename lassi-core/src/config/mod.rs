//! Runtime configuration types for the Lassi Corner server.
//!
//! These are the validated forms of the configuration file. Loading and
//! parsing live in the server crate.

mod auth;
mod kiosk;
mod server;
mod storefront;

pub use auth::AuthConfig;
pub use kiosk::KioskConfig;
pub use server::ServerConfig;
pub use storefront::StorefrontConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// Every section except `server` can be swapped at runtime on reload.
#[derive(Clone)]
pub struct SharedConfig {
    pub server: Arc<RwLock<ServerConfig>>,
    /// Session token signing.
    pub auth: Arc<RwLock<AuthConfig>>,
    /// Kiosk authentication for the tunnel endpoints.
    pub kiosk: Arc<RwLock<KioskConfig>>,
    /// CORS origins of the customer storefront.
    pub storefront: Arc<RwLock<StorefrontConfig>>,
}
