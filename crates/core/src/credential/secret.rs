//! Secret hashing with Argon2id.
//!
//! Uses the recommended Argon2id variant with secure defaults.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors that can occur while hashing a secret.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Failed to hash secret.
    #[error("failed to hash secret: {0}")]
    HashError(String),
}

/// Hashes an account secret using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `CredentialError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use bursar_core::credential::hash_secret;
///
/// let hash = hash_secret("s1").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_secret(secret: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::HashError(e.to_string()))
}

/// Verifies a presented secret against a stored hash.
///
/// Fails closed: a malformed hash or any verifier error yields `false`.
/// The comparison itself is constant time inside `argon2`.
///
/// # Example
///
/// ```
/// use bursar_core::credential::{hash_secret, verify_secret};
///
/// let hash = hash_secret("s1").unwrap();
/// assert!(verify_secret("s1", &hash));
/// assert!(!verify_secret("wrong", &hash));
/// ```
#[must_use]
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok()
}
