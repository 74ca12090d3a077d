//! Password hashing and verification utilities
//!
//! Hashes with bcrypt and verifies candidates against stored hashes.

use tracing::{debug, error};

/// Error types for password operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
}

pub trait PasswordUtils {
    /// Hashes the given password with bcrypt
    fn hash_password(password: &str) -> Result<String, PasswordError>;

    /// Verifies the given password against the stored hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError>;

    /// Generates a random opaque token, hex-encoded
    fn generate_reset_token() -> String;
}

pub struct PasswordUtilsImpl;

impl PasswordUtils for PasswordUtilsImpl {
    fn hash_password(password: &str) -> Result<String, PasswordError> {
        debug!("Hashing password");
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|err| {
            error!("Failed to hash password: {}", err);
            PasswordError::HashingFailed(err.to_string())
        })
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(password, hash).map_err(|err| {
            error!("Password verification error: {}", err);
            PasswordError::VerificationFailed(err.to_string())
        })
    }

    fn generate_reset_token() -> String {
        use rand::Rng;
        let bytes: [u8; 16] = rand::thread_rng().gen();
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
