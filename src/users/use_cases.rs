use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::AppError,
    users::{schemas::UserReadSchema, services::UsersService},
};

#[async_trait]
pub trait UserInfoUseCase: Send + Sync {
    async fn execute(&self, user_id: Uuid) -> Result<UserReadSchema, AppError>;
}

pub struct UserInfoUseCaseImpl {
    users_service: Arc<dyn UsersService>,
}

impl UserInfoUseCaseImpl {
    pub fn new(users_service: Arc<dyn UsersService>) -> Self {
        Self { users_service }
    }
}

#[async_trait]
impl UserInfoUseCase for UserInfoUseCaseImpl {
    async fn execute(&self, user_id: Uuid) -> Result<UserReadSchema, AppError> {
        let user = self.users_service.get_user(user_id).await?;
        debug!(user_id = %user.id, "user info loaded");
        Ok(user)
    }
}
