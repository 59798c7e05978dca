use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{auth::tokens::JwtKeys, config::Settings, db};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Settings>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub async fn init(config: Settings) -> anyhow::Result<Self> {
        let db = db::connect(&config.db, config.debug).await?;
        let jwt = JwtKeys::from_config(&config.auth_jwt).context("load jwt keys")?;
        Ok(Self::from_parts(db, Arc::new(config), Arc::new(jwt)))
    }

    pub fn from_parts(db: PgPool, config: Arc<Settings>, jwt: Arc<JwtKeys>) -> Self {
        Self { db, config, jwt }
    }
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
