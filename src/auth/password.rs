/// Password Hashing and Verification
///
/// bcrypt does the salting and the constant-time comparison. Work is moved
/// onto tokio's blocking pool so actix workers keep serving requests.

use std::sync::Arc;

use bcrypt::{hash, verify};

use crate::error::{AppError, ConfigError};
use crate::validators::{is_valid_password, MAX_PASSWORD_LENGTH};

/// Lowest cost bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns error if:
/// - Password fails validation (too short or too long)
/// - Bcrypt hashing fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    is_valid_password(password)?;

    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// # Errors
/// Returns error if the stored hash is not a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Ok(false);
    }
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Password hashing collaborator shared by the services.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Compared against when the identity is unknown, so both login failure
    /// paths do the same bcrypt work.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(AppError::Config(ConfigError::InvalidValue(format!(
                "bcrypt cost {} is outside {}..={}",
                cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
            ))));
        }
        let dummy_hash = hash("not-a-real-password", cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }

    /// Burns one comparison's worth of time; always `false`.
    pub async fn verify_dummy(&self, password: &str) -> bool {
        let hash = self.dummy_hash.clone();
        let _ = self.verify(password, &hash).await;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = MIN_BCRYPT_COST;

    #[test]
    fn test_hash_password() {
        let password = "password1";
        let hash = hash_password(password, TEST_COST).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("password1", TEST_COST).unwrap();
        let second = hash_password("password1", TEST_COST).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("password1", TEST_COST).expect("Failed to hash password");

        assert!(verify_password("password1", &hash).unwrap());
        assert!(!verify_password("password2", &hash).unwrap());
    }

    #[test]
    fn test_too_short_password() {
        assert!(hash_password("short", TEST_COST).is_err());
    }

    #[test]
    fn test_too_long_password() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(hash_password(&long_password, TEST_COST).is_err());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_password("password1", "not-a-hash").is_err());
    }

    #[test]
    fn test_cost_is_bounded() {
        for cost in [MIN_BCRYPT_COST - 1, MAX_BCRYPT_COST + 1] {
            assert!(matches!(
                PasswordHasher::new(cost),
                Err(AppError::Config(ConfigError::InvalidValue(_)))
            ));
        }
        assert!(PasswordHasher::new(TEST_COST).is_ok());
    }

    #[tokio::test]
    async fn test_hasher_round_trip() {
        let hasher = PasswordHasher::new(TEST_COST).unwrap();
        let hash = hasher.hash("password1").await.unwrap();

        assert!(hasher.verify("password1", &hash).await.unwrap());
        assert!(!hasher.verify("Password1", &hash).await.unwrap());
        assert!(!hasher.verify_dummy("password1").await);
    }
}
