//! Kiosk configuration.

use crate::auth::verify_password;

/// Kiosk credentials with the secret stored as an argon2 hash.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub secret_hash: String,
}

impl KioskConfig {
    pub fn new(secret_hash: String) -> Self {
        Self { secret_hash }
    }

    /// Verify the plaintext secret presented by a kiosk.
    pub fn verify_secret(&self, plaintext: &str) -> bool {
        verify_password(plaintext, &self.secret_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;

    #[test]
    fn test_verify_secret() {
        let kiosk = KioskConfig::new(hash_password("counter-kiosk").unwrap());
        assert!(kiosk.verify_secret("counter-kiosk"));
        assert!(!kiosk.verify_secret("wrong-secret"));
    }
}
