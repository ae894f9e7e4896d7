//! Customer credentials: password hashing and session tokens.

pub mod password;
pub mod session;

pub use password::{PasswordError, hash_password, verify_password};
pub use session::{SessionKey, TokenError};
