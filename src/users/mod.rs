use crate::state::AppState;
use axum::Router;

pub mod depends;
pub mod models;
pub mod repository;
pub mod router;
pub mod schemas;
pub mod services;
pub mod use_cases;

pub fn router() -> Router<AppState> {
    router::users_routes()
}
