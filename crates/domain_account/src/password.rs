//! Argon2id password hashing and verification.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

use crate::error::AccountError;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccountError::PasswordHash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    /// The comparison inside the verifier is constant-time.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AccountError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AccountError::PasswordHash(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AccountError::PasswordHash(e.to_string())),
        }
    }

    /// [`hash_password`](Self::hash_password) on the blocking thread pool
    pub async fn hash(&self, password: String) -> Result<String, AccountError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AccountError::PasswordHash(format!("hashing task failed: {e}")))?
    }

    /// [`verify_password`](Self::verify_password) on the blocking thread pool
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AccountError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AccountError::PasswordHash(format!("verification task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("testpassword").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("testpassword", &hash).unwrap());
        assert!(!hasher.verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash_password("testpassword").unwrap();
        let second = hasher.hash_password("testpassword").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify_password("testpassword", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_blocking_pool_variants_agree() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("testpassword".to_string()).await.unwrap();

        let (right, wrong) = tokio::join!(
            hasher.verify("testpassword".to_string(), hash.clone()),
            hasher.verify("wrongpassword".to_string(), hash.clone()),
        );
        assert!(right.unwrap());
        assert!(!wrong.unwrap());
        assert!(hasher.verify_password("testpassword", &hash).unwrap());
    }
}
