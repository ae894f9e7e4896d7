//! Session token configuration.

use crate::auth::SessionKey;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session: SessionKey,
}

impl AuthConfig {
    pub fn new(token_secret: &[u8], token_ttl: time::Duration) -> Self {
        Self {
            session: SessionKey::new(token_secret, token_ttl),
        }
    }
}
