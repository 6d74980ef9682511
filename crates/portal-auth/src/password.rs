//! Password hashing and verification

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::warn;

use crate::error::AuthError;

/// Hash a password with Argon2id and a fresh random salt
///
/// The result is a PHC string; salt and parameters travel inside it.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a candidate password against a stored PHC hash
///
/// Fails closed: a hash that cannot be parsed never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-pass", &hash));
    }

    #[test]
    fn test_mutated_password_rejected() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(!verify_password("s3cret-pasS", &hash));
        assert!(!verify_password("s3cret-pas", &hash));
        assert!(!verify_password("s3cret-pass ", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_salts_differ_per_hash() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same-password", &first));
        assert!(verify_password("same-password", &second));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$2a$10$bcryptlookingbutnot"));
    }
}
