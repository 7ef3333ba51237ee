//! Password hashing and verification using Argon2id
//!
//! Uses the `argon2` crate's default parameters (Argon2id, OWASP
//! recommended costs) with a random salt per hash and constant-time
//! verification.
//!
//! # Example
//!
//! ```rust
//! use cohort_portal::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> anyhow::Result<()> {
//! let hash = hash_password("correct-horse-battery-staple")?;
//!
//! assert!(verify_password("correct-horse-battery-staple", &hash)?);
//! assert!(!verify_password("wrong-password", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hash a password using Argon2id
///
/// # Errors
///
/// Returns an error if the hashing operation fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a PHC-format hash
///
/// Uses constant-time comparison to prevent timing attacks.
///
/// # Errors
///
/// Returns an error if the hash format is invalid or verification
/// fails for a reason other than a wrong password
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "test-password-123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).expect("Failed to verify"));
        assert!(!verify_password("wrong-password", &hash).expect("Failed to verify"));
    }

    #[test]
    fn different_hashes_for_same_password() {
        let password = "same-password";
        let hash1 = hash_password(password).expect("Failed to hash 1");
        let hash2 = hash_password(password).expect("Failed to hash 2");

        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1).expect("Failed to verify 1"));
        assert!(verify_password(password, &hash2).expect("Failed to verify 2"));
    }

    #[test]
    fn invalid_hash_format_errors() {
        let result = verify_password("password", "invalid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }
}
