use async_trait::async_trait;

use crate::{
    core::{
        repository::{BaseRepository, BaseRepositoryImpl},
        schemas::QueryAll,
    },
    error::AppError,
    users::{
        models::User,
        schemas::{UserCreateDTO, UserReadSchema, UserUpdateDTO},
    },
};

#[async_trait]
pub trait UsersRepository: BaseRepository<UserReadSchema, UserCreateDTO, UserUpdateDTO> {
    /// Full record (including the password hash) for the given email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

pub type UsersRepositoryImpl =
    BaseRepositoryImpl<User, UserReadSchema, UserCreateDTO, UserUpdateDTO>;

#[async_trait]
impl UsersRepository for UsersRepositoryImpl {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let query = QueryAll::default().filter("email", email).paginate(1, 0);
        Ok(self.find_models(&query).await?.pop())
    }
}
