use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    users::{
        models::User,
        repository::UsersRepository,
        schemas::{UserCreateDTO, UserReadSchema},
    },
};

#[async_trait]
pub trait UsersService: Send + Sync {
    async fn create_user(&self, new_user_data: UserCreateDTO) -> Result<Uuid, AppError>;

    async fn get_user(&self, user_id: Uuid) -> Result<UserReadSchema, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

pub struct UsersServiceImpl {
    users_repository: Arc<dyn UsersRepository>,
}

impl UsersServiceImpl {
    pub fn new(users_repository: Arc<dyn UsersRepository>) -> Self {
        Self { users_repository }
    }
}

#[async_trait]
impl UsersService for UsersServiceImpl {
    async fn create_user(&self, new_user_data: UserCreateDTO) -> Result<Uuid, AppError> {
        let user = self.users_repository.create(new_user_data).await?;
        Ok(user.id)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<UserReadSchema, AppError> {
        self.users_repository.get_one(user_id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users_repository.find_by_email(email).await
    }
}
