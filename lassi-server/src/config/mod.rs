//! Configuration module for lassi-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles kiosk secret hashing.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{
    AuthConfig, KioskConfig, ServerConfig, SharedConfig, StorefrontConfig,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Shortest accepted session token secret, in bytes.
const MIN_TOKEN_SECRET_LEN: usize = 16;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("password hashing error: {0}")]
    HashError(#[from] lassi_core::auth::PasswordError),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub kiosk: KioskConfig,
    pub storefront: StorefrontConfig,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            server: Arc::new(RwLock::new(self.server)),
            auth: Arc::new(RwLock::new(self.auth)),
            kiosk: Arc::new(RwLock::new(self.kiosk)),
            storefront: Arc::new(RwLock::new(self.storefront)),
        }
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Hash the kiosk secret if it's plaintext (and rewrite the file)
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        let secret_hash = if file_config.is_kiosk_secret_hashed() {
            file_config.kiosk.secret.clone()
        } else {
            let hash = lassi_core::auth::hash_password(&file_config.kiosk.secret)?;
            file_config.kiosk.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Kiosk secret hashed and config file updated");
            hash
        };

        Ok(build_loaded_config(file_config, secret_hash))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.auth.token_secret.len() < MIN_TOKEN_SECRET_LEN {
        return Err(ConfigError::ValidationError(format!(
            "auth.token_secret must be at least {MIN_TOKEN_SECRET_LEN} bytes"
        )));
    }
    if config.auth.token_ttl_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "auth.token_ttl_minutes must be positive".to_string(),
        ));
    }
    if config.kiosk.secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "kiosk.secret must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig, secret_hash: String) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        auth: AuthConfig::new(
            file_config.auth.token_secret.as_bytes(),
            time::Duration::minutes(i64::from(file_config.auth.token_ttl_minutes)),
        ),
        kiosk: KioskConfig::new(secret_hash),
        storefront: StorefrontConfig {
            allowed_origins: file_config.storefront.allowed_origins,
        },
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[server]
listen = "127.0.0.1:3000"

[auth]
token_secret = "a-long-random-session-secret"

[kiosk]
secret = "counter-kiosk"
"#;

    #[test]
    fn test_load_hashes_plaintext_kiosk_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lassi-config.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let loaded = ConfigLoader::new(&path, None).load().unwrap();
        assert!(loaded.kiosk.verify_secret("counter-kiosk"));
        assert_eq!(loaded.auth.session.ttl(), time::Duration::hours(1));

        let rewritten: FileConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(rewritten.is_kiosk_secret_hashed());
        assert_eq!(rewritten.kiosk.secret, loaded.kiosk.secret_hash);

        // A second load keeps the stored hash.
        let reloaded = ConfigLoader::new(&path, None).reload().unwrap();
        assert_eq!(reloaded.kiosk.secret_hash, loaded.kiosk.secret_hash);
    }

    #[test]
    fn test_listen_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lassi-config.toml");
        std::fs::write(&path, CONFIG).unwrap();

        let listen: SocketAddr = "0.0.0.0:8081".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen)).load().unwrap();
        assert_eq!(loaded.server.listen, listen);
    }

    #[test]
    fn test_short_token_secret_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lassi-config.toml");
        std::fs::write(
            &path,
            "[auth]\ntoken_secret = \"short\"\n\n[kiosk]\nsecret = \"k\"\n",
        )
        .unwrap();

        assert!(matches!(
            ConfigLoader::new(&path, None).load(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
