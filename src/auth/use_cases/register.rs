use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::security::SecurityService,
    error::AppError,
    users::{
        schemas::{UserCreateDTO, UserCreateSchema},
        services::UsersService,
    },
};

const MAX_FIELD_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes the submitted user and collects every invalid field.
fn validate(mut new_user: UserCreateSchema) -> Result<UserCreateSchema, AppError> {
    new_user.username = new_user.username.trim().to_string();
    new_user.email = new_user.email.trim().to_lowercase();

    let mut fields = Vec::new();
    let mut problems = Vec::new();

    let username_len = new_user.username.chars().count();
    if username_len == 0 || username_len > MAX_FIELD_LEN {
        fields.push("username".to_string());
        problems.push(format!("Username must be 1 to {MAX_FIELD_LEN} characters"));
    }
    if !is_valid_email(&new_user.email) || new_user.email.chars().count() > MAX_FIELD_LEN {
        fields.push("email".to_string());
        problems.push("Invalid email".to_string());
    }
    if new_user.password.chars().count() < MIN_PASSWORD_LEN {
        fields.push("password".to_string());
        problems.push("Password too short".to_string());
    }

    if fields.is_empty() {
        Ok(new_user)
    } else {
        Err(AppError::Validation {
            fields,
            message: problems.join("; "),
        })
    }
}

#[async_trait]
pub trait RegisterUseCase: Send + Sync {
    /// Creates the user and returns its id.
    async fn execute(&self, new_user: UserCreateSchema) -> Result<Uuid, AppError>;
}

pub struct RegisterUseCaseImpl {
    security_service: Arc<dyn SecurityService>,
    users_service: Arc<dyn UsersService>,
}

impl RegisterUseCaseImpl {
    pub fn new(security_service: Arc<dyn SecurityService>, users_service: Arc<dyn UsersService>) -> Self {
        Self {
            security_service,
            users_service,
        }
    }
}

#[async_trait]
impl RegisterUseCase for RegisterUseCaseImpl {
    async fn execute(&self, new_user: UserCreateSchema) -> Result<Uuid, AppError> {
        let new_user = validate(new_user).map_err(|e| {
            warn!(error = %e, "registration rejected");
            e
        })?;

        if self.users_service.find_by_email(&new_user.email).await?.is_some() {
            warn!(email = %new_user.email, "email already registered");
            return Err(AppError::already_exists("email", "Email already registered"));
        }

        let hashed_password = self.security_service.encode_password(&new_user.password).await?;
        let new_user_data = UserCreateDTO::new(new_user.username, new_user.email, hashed_password);
        let email = new_user_data.email.clone();
        let user_id = self.users_service.create_user(new_user_data).await?;

        info!(user_id = %user_id, email = %email, "user registered");
        Ok(user_id)
    }
}
