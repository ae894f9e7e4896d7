//! Stateless session tokens.
//!
//! A token is `{user_id}.{expires_at}.{signature}` where `expires_at` is a
//! unix timestamp and `signature` is the unpadded base64 of
//! `HMAC-SHA256("{user_id}.{expires_at}", secret)`.

use ring::hmac;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature encoding")]
    InvalidBase64,
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("token expired")]
    Expired,
}

impl From<ring::error::Unspecified> for TokenError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Key used to issue and verify session tokens.
#[derive(Debug, Clone)]
pub struct SessionKey {
    key: hmac::Key,
    ttl: time::Duration,
}

impl SessionKey {
    pub fn new(secret: &[u8], ttl: time::Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> time::Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: Uuid) -> String {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.issue_until(user_id, now + self.ttl.whole_seconds())
    }

    fn issue_until(&self, user_id: Uuid, expires_at: i64) -> String {
        let payload = format!("{user_id}.{expires_at}");
        let signature = hmac::sign(&self.key, payload.as_bytes());
        format!(
            "{payload}.{}",
            fast32::base64::RFC4648_NOPAD.encode(signature.as_ref())
        )
    }

    /// Verify a token and return the user it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, time::OffsetDateTime::now_utc().unix_timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Uuid, TokenError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (user_id, expires_at) = payload.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = fast32::base64::RFC4648_NOPAD
            .decode_str(signature)
            .map_err(|_| TokenError::InvalidBase64)?;
        hmac::verify(&self.key, payload.as_bytes(), &signature)?;

        let expires_at: i64 = expires_at.parse().map_err(|_| TokenError::Malformed)?;
        if now >= expires_at {
            return Err(TokenError::Expired);
        }
        Uuid::parse_str(user_id).map_err(|_| TokenError::Malformed)
    }
}
