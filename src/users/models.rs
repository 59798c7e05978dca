use sqlx::FromRow;
use uuid::Uuid;

use crate::core::repository::{Column, ColumnKind, Model};

/// User record in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: Vec<u8>, // argon2 PHC string, never exposed
    pub is_active: bool,
}

impl Model for User {
    const NAME: &'static str = "User";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", ColumnKind::Uuid),
        Column::new("username", ColumnKind::Text),
        Column::new("email", ColumnKind::Text),
        Column::new("hashed_password", ColumnKind::Bytes),
        Column::new("is_active", ColumnKind::Bool),
    ];
}
