//! TOML file configuration structures.
//!
//! These structs directly map to the `lassi-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub kiosk: KioskConfig,
    #[serde(default)]
    pub storefront: StorefrontConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:5000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5000))
}

/// Customer session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens.
    pub token_secret: String,
    /// Session lifetime in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u32,
}

fn default_token_ttl() -> u32 {
    60
}

/// Kiosk configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    /// The kiosk secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Customer storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Origins allowed for CORS. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl FileConfig {
    /// Check if the kiosk secret is already hashed (argon2 format).
    pub fn is_kiosk_secret_hashed(&self) -> bool {
        self.kiosk.secret.starts_with("$argon2")
    }
}
