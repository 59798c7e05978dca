use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    auth::{schemas::TokenPairSchema, security::SecurityService, tokens::TokenService},
    error::AppError,
    users::services::UsersService,
};

#[async_trait]
pub trait LoginUseCase: Send + Sync {
    async fn execute(&self, email: &str, password: &str) -> Result<TokenPairSchema, AppError>;
}

pub struct LoginUseCaseImpl {
    security_service: Arc<dyn SecurityService>,
    token_service: Arc<dyn TokenService>,
    users_service: Arc<dyn UsersService>,
}

impl LoginUseCaseImpl {
    pub fn new(
        security_service: Arc<dyn SecurityService>,
        token_service: Arc<dyn TokenService>,
        users_service: Arc<dyn UsersService>,
    ) -> Self {
        Self {
            security_service,
            token_service,
            users_service,
        }
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".into())
}

#[async_trait]
impl LoginUseCase for LoginUseCaseImpl {
    async fn execute(&self, email: &str, password: &str) -> Result<TokenPairSchema, AppError> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.users_service.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(invalid_credentials());
        };

        if !self
            .security_service
            .validate_password(password, &user.hashed_password)
            .await?
        {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(invalid_credentials());
        }

        let pair = self.token_service.create_token_pair(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(pair)
    }
}
