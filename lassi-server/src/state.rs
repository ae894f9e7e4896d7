//! Application state shared across all request handlers.

use crate::config::runtime::SharedConfig;
use lassi_core::framework::DatabaseProcessor;
use lassi_core::relay::OrderRelay;
use sqlx::PgPool;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Runtime configuration with per-section locks (reloaded on SIGHUP).
    pub config: SharedConfig,
    /// Relay delivering placed orders to the kiosk.
    pub relay: OrderRelay,
}

impl AppState {
    pub fn new(db: PgPool, config: SharedConfig, relay: OrderRelay) -> Self {
        Self { db, config, relay }
    }

    pub fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor {
            pool: self.db.clone(),
        }
    }
}
