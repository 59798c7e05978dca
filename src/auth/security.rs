use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tracing::error;

use crate::error::AppError;

#[async_trait]
pub trait SecurityService: Send + Sync {
    /// Hashes a plaintext password into opaque bytes for storage.
    async fn encode_password(&self, password: &str) -> Result<Vec<u8>, AppError>;

    async fn validate_password(&self, password: &str, hashed_password: &[u8]) -> Result<bool, AppError>;
}

/// Argon2 hashing, run off the async executor. Hashes are stored as the
/// UTF-8 bytes of the PHC string.
#[derive(Clone, Default)]
pub struct SecurityServiceImpl;

impl SecurityServiceImpl {
    fn hash(password: &str) -> Result<Vec<u8>, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hashing failed");
                anyhow!("argon2: {e}")
            })?;
        Ok(phc.to_string().into_bytes())
    }

    fn matches(password: &str, hashed_password: &[u8]) -> Result<bool, AppError> {
        let phc = std::str::from_utf8(hashed_password).context("stored password hash is not utf-8")?;
        let parsed = PasswordHash::new(phc).map_err(|e| {
            error!(error = %e, "stored password hash is malformed");
            anyhow!("argon2: {e}")
        })?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[async_trait]
impl SecurityService for SecurityServiceImpl {
    async fn encode_password(&self, password: &str) -> Result<Vec<u8>, AppError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .context("password hashing task")?
    }

    async fn validate_password(&self, password: &str, hashed_password: &[u8]) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_vec();
        tokio::task::spawn_blocking(move || Self::matches(&password, &hashed_password))
            .await
            .context("password verify task")?
    }
}
