use crate::state::AppState;
use axum::Router;

pub mod depends;
pub mod extractors;
pub mod router;
pub mod schemas;
pub mod security;
pub mod tokens;
pub mod use_cases;

pub fn router() -> Router<AppState> {
    router::auth_routes()
}
