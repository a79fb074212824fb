//! Credential hashing using argon2
//!
//! One-way, salted hashing for passwords and for refresh tokens before they
//! are persisted; nothing usable as a secret is ever stored in plaintext.
//!
//! # Performance Considerations
//!
//! Argon2 is intentionally CPU-intensive. The async wrappers offload the
//! work onto the blocking thread pool so request handlers never stall the
//! async runtime.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Credential hashing service
///
/// Uses Argon2id with a fresh random salt per call, so two digests of the
/// same input always differ. Verification goes through the argon2 crate's
/// comparison, which does not short-circuit on the first mismatching byte.
pub struct PasswordService;

impl PasswordService {
    /// Hash a secret (blocking operation)
    pub fn hash(secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let digest = argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash credential: {}", e))?;
        Ok(digest.to_string())
    }

    /// Hash a secret on the blocking thread pool
    pub async fn hash_async(secret: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&secret))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a secret against a stored digest (blocking operation)
    pub fn verify(secret: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| anyhow::anyhow!("Invalid digest format: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2.verify_password(secret.as_bytes(), &parsed).is_ok())
    }

    /// Verify a secret on the blocking thread pool
    pub async fn verify_async(secret: String, digest: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&secret, &digest))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
