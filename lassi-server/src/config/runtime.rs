//! Runtime configuration re-exports.
//!
//! The validated config types live in `lassi_core::config`.

pub use lassi_core::config::{
    AuthConfig, KioskConfig, ServerConfig, SharedConfig, StorefrontConfig,
};
