use axum::{routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
    users::{depends::UserInfo, schemas::UserReadSchema},
};

pub fn users_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(me))
}

#[instrument(skip(uc))]
pub async fn me(
    AuthUser(user_id): AuthUser,
    UserInfo(uc): UserInfo,
) -> Result<Json<UserReadSchema>, AppError> {
    let user = uc.execute(user_id).await?;
    Ok(Json(user))
}
