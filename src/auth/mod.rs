use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{DateTime, Utc};

use crate::{
    domain::Admin,
    error::{AppError, Result},
    repository::AdminRepository,
};

pub mod session;

pub use session::{AdminSession, SessionConfig};

pub struct AuthService {
    admin_repo: Arc<dyn AdminRepository>,
}

impl AuthService {
    pub fn new(admin_repo: Arc<dyn AdminRepository>) -> Self {
        Self { admin_repo }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    /// Hash a password using Argon2 with a fresh random salt.
    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Checks a username/password pair and stamps `last_login` on success.
    ///
    /// Unknown usernames, wrong passwords and unreadable stored hashes all come back
    /// as `Ok(None)` so callers cannot tell them apart.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Admin>> {
        let Some(mut admin) = self.admin_repo.find_by_username(username).await? else {
            return Ok(None);
        };

        let password_valid = match Self::verify_password(password, &admin.password_hash).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("Stored hash for admin {} is unreadable: {}", admin.id, e);
                false
            }
        };

        if !password_valid {
            return Ok(None);
        }

        self.admin_repo.record_login(admin.id, now).await?;
        admin.last_login = Some(now);

        Ok(Some(admin))
    }
}
