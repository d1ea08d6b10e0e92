//! # Credential Hashing Boundary
//!
//! The staff directory never stores or compares plaintext passwords; it
//! routes through this trait. The default implementation is argon2 with
//! per-hash random salts. Stock, sale, and analytics logic never touch
//! credentials at all.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};

use vela_core::error::{CoreError, CoreResult};

/// Hashing seam at the authentication boundary.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext password for storage.
    fn hash(&self, password: &str) -> CoreResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id hasher with random salts. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArgonHasher;

impl CredentialHasher for ArgonHasher {
    fn hash(&self, password: &str) -> CoreResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CoreError::state(format!("Failed to hash password: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hasher = ArgonHasher;
        let hash = hasher.hash("hunter2").unwrap();

        assert_ne!(hash, "hunter2");
        assert!(hasher.verify("hunter2", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let hasher = ArgonHasher;
        assert!(!hasher.verify("hunter2", "not-a-phc-string"));
    }
}
