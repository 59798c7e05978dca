use std::{convert::Infallible, sync::Arc};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{
    auth::{
        security::{SecurityService, SecurityServiceImpl},
        tokens::{TokenService, TokenServiceImpl},
        use_cases::{
            LoginUseCase, LoginUseCaseImpl, RefreshUseCase, RefreshUseCaseImpl, RegisterUseCase,
            RegisterUseCaseImpl,
        },
    },
    state::AppState,
    users::depends::users_service,
};

// --- services ---

pub fn security_service() -> Arc<dyn SecurityService> {
    Arc::new(SecurityServiceImpl)
}

// TODO: back refresh tokens with a tokens repository so logout can revoke them.
pub fn token_service(state: &AppState) -> Arc<dyn TokenService> {
    Arc::new(TokenServiceImpl::new(state.jwt.clone()))
}

// --- use cases ---

pub struct Register(pub Arc<dyn RegisterUseCase>);

#[async_trait]
impl FromRequestParts<AppState> for Register {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Register(Arc::new(RegisterUseCaseImpl::new(
            security_service(),
            users_service(state),
        ))))
    }
}

pub struct Login(pub Arc<dyn LoginUseCase>);

#[async_trait]
impl FromRequestParts<AppState> for Login {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Login(Arc::new(LoginUseCaseImpl::new(
            security_service(),
            token_service(state),
            users_service(state),
        ))))
    }
}

pub struct Refresh(pub Arc<dyn RefreshUseCase>);

#[async_trait]
impl FromRequestParts<AppState> for Refresh {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Refresh(Arc::new(RefreshUseCaseImpl::new(
            token_service(state),
            users_service(state),
        ))))
    }
}
