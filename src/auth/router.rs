use axum::{routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::{
        depends::{Login, Refresh, Register},
        extractors::AuthUser,
        schemas::{LoginSchema, MessageSchema, RefreshSchema, RegisteredSchema, TokenPairSchema},
    },
    error::AppError,
    state::AppState,
    users::schemas::UserCreateSchema,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
}

#[instrument(skip(uc, new_user))]
pub async fn register(
    Register(uc): Register,
    Json(new_user): Json<UserCreateSchema>,
) -> Result<Json<RegisteredSchema>, AppError> {
    let id = uc.execute(new_user).await?;
    Ok(Json(RegisteredSchema { msg: "success", id }))
}

#[instrument(skip(uc, payload))]
pub async fn login(
    Login(uc): Login,
    Json(payload): Json<LoginSchema>,
) -> Result<Json<TokenPairSchema>, AppError> {
    let pair = uc.execute(&payload.email, &payload.password).await?;
    Ok(Json(pair))
}

/// Tokens are stateless; the client drops them.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<MessageSchema> {
    info!(user_id = %user_id, "user logged out");
    Json(MessageSchema { msg: "logout" })
}

#[instrument(skip(uc, payload))]
pub async fn refresh(
    Refresh(uc): Refresh,
    Json(payload): Json<RefreshSchema>,
) -> Result<Json<TokenPairSchema>, AppError> {
    let pair = uc.execute(&payload.refresh_token).await?;
    Ok(Json(pair))
}
