#![allow(dead_code)]

pub mod postgres;

use std::{collections::HashMap, sync::Arc, sync::Mutex, time::Duration};

use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

use finance_accounting::{
    app::build_app,
    auth::tokens::{JwtKeys, TokenServiceImpl},
    config::Settings,
    core::{
        repository::{BaseRepository, UpdateSchema},
        schemas::{PaginationResult, QueryAll},
    },
    db,
    error::AppError,
    state::AppState,
    users::{
        models::User,
        repository::UsersRepository,
        schemas::{UserCreateDTO, UserReadSchema, UserUpdateDTO},
    },
};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

pub fn test_settings() -> Settings {
    let env = HashMap::from([
        ("DEBUG", "true"),
        ("BASE_URL", "http://localhost:8000"),
        ("DB__HOST", "localhost"),
        ("DB__PORT", "5432"),
        ("DB__USER", "postgres"),
        ("DB__PASSWORD", "postgres"),
        ("DB__NAME", "finance_test"),
        ("CORS_ORIGINS", r#"["http://localhost:3000"]"#),
        ("AUTH_JWT__ALGORITHM", "HS256"),
    ]);
    Settings::from_lookup(|k| env.get(k).map(|v| v.to_string())).expect("test settings")
}

pub fn test_keys() -> Arc<JwtKeys> {
    Arc::new(JwtKeys::from_secret(
        TEST_SECRET,
        Duration::from_secs(180),
        Duration::from_secs(7 * 24 * 3600),
    ))
}

pub fn token_service() -> TokenServiceImpl {
    TokenServiceImpl::new(test_keys())
}

/// App over a lazily-connected pool: nothing reaches the database unless a
/// handler actually queries it.
pub fn test_app() -> Router {
    let settings = test_settings();
    let pool = db::connect_lazy(&settings.db, settings.debug).expect("lazy pool");
    build_app(AppState::from_parts(pool, Arc::new(settings), test_keys()))
}

/// In-memory stand-in for the Postgres users repository.
#[derive(Default)]
pub struct FakeUsersRepository {
    pub users: Mutex<Vec<User>>,
}

impl FakeUsersRepository {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl BaseRepository<UserReadSchema, UserCreateDTO, UserUpdateDTO> for FakeUsersRepository {
    async fn get_one(&self, id: Uuid) -> Result<UserReadSchema, AppError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(UserReadSchema::from)
            .ok_or_else(|| AppError::not_found("User", id))
    }

    async fn get_all(&self) -> Result<Vec<UserReadSchema>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(UserReadSchema::from)
            .collect())
    }

    async fn create(&self, create_object: UserCreateDTO) -> Result<UserReadSchema, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == create_object.email) {
            return Err(AppError::already_exists("email", "duplicate email"));
        }
        let user = User {
            id: create_object.id,
            username: create_object.username,
            email: create_object.email,
            hashed_password: create_object.hashed_password,
            is_active: false,
        };
        users.push(user.clone());
        Ok(user.into())
    }

    async fn update(&self, update_object: UserUpdateDTO) -> Result<UserReadSchema, AppError> {
        let id = update_object.id();
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User", id))?;
        if let Some(v) = update_object.username {
            user.username = v;
        }
        if let Some(v) = update_object.email {
            user.email = v;
        }
        if let Some(v) = update_object.hashed_password {
            user.hashed_password = v;
        }
        if let Some(v) = update_object.is_active {
            user.is_active = v;
        }
        Ok(user.clone().into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(true)
    }

    async fn query_all(&self, _query: QueryAll) -> Result<PaginationResult<UserReadSchema>, AppError> {
        let objects = self.get_all().await?;
        let count = objects.len() as i64;
        Ok(PaginationResult { objects, count })
    }
}

#[async_trait]
impl UsersRepository for FakeUsersRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}
