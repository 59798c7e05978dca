use std::{convert::Infallible, sync::Arc};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    state::AppState,
    users::{
        repository::{UsersRepository, UsersRepositoryImpl},
        services::{UsersService, UsersServiceImpl},
        use_cases::{UserInfoUseCase, UserInfoUseCaseImpl},
    },
};

// --- repositories ---

pub fn users_repository(state: &AppState) -> Arc<dyn UsersRepository> {
    Arc::new(UsersRepositoryImpl::new(state.db.clone()))
}

// --- services ---

pub fn users_service(state: &AppState) -> Arc<dyn UsersService> {
    Arc::new(UsersServiceImpl::new(users_repository(state)))
}

// --- use cases ---

/// Per-request [`UserInfoUseCase`].
pub struct UserInfo(pub Arc<dyn UserInfoUseCase>);

#[async_trait]
impl FromRequestParts<AppState> for UserInfo {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(UserInfo(Arc::new(UserInfoUseCaseImpl::new(users_service(state)))))
    }
}
