use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    auth::{schemas::TokenPairSchema, tokens::TokenService},
    error::AppError,
    users::services::UsersService,
};

#[async_trait]
pub trait RefreshUseCase: Send + Sync {
    /// Exchanges a refresh token for a new token pair.
    async fn execute(&self, refresh_token: &str) -> Result<TokenPairSchema, AppError>;
}

pub struct RefreshUseCaseImpl {
    token_service: Arc<dyn TokenService>,
    users_service: Arc<dyn UsersService>,
}

impl RefreshUseCaseImpl {
    pub fn new(token_service: Arc<dyn TokenService>, users_service: Arc<dyn UsersService>) -> Self {
        Self {
            token_service,
            users_service,
        }
    }
}

#[async_trait]
impl RefreshUseCase for RefreshUseCaseImpl {
    async fn execute(&self, refresh_token: &str) -> Result<TokenPairSchema, AppError> {
        let claims = self.token_service.verify_refresh(refresh_token)?;

        let user = match self.users_service.get_user(claims.sub).await {
            Ok(user) => user,
            Err(AppError::NotFound { .. }) => {
                warn!(user_id = %claims.sub, "refresh for unknown user");
                return Err(AppError::Unauthorized("User not found".into()));
            }
            Err(e) => return Err(e),
        };

        let pair = self.token_service.create_token_pair(user.id)?;
        info!(user_id = %user.id, "tokens refreshed");
        Ok(pair)
    }
}
