use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::repository::{CreateSchema, FieldValue, UpdateSchema};
use crate::users::models::User;

/// Request body of `POST /auth/register`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateSchema {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for UserCreateSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCreateSchema")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// What the repository stores for a new user: the password is already hashed.
#[derive(Debug, Clone)]
pub struct UserCreateDTO {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: Vec<u8>,
}

impl UserCreateDTO {
    pub fn new(username: String, email: String, hashed_password: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            hashed_password,
        }
    }
}

impl CreateSchema for UserCreateDTO {
    fn into_values(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("id", FieldValue::Uuid(self.id)),
            ("username", FieldValue::Text(self.username)),
            ("email", FieldValue::Text(self.email)),
            ("hashed_password", FieldValue::Bytes(self.hashed_password)),
        ]
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDTO {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub hashed_password: Option<Vec<u8>>,
    pub is_active: Option<bool>,
}

impl UpdateSchema for UserUpdateDTO {
    fn id(&self) -> Uuid {
        self.id
    }

    fn into_changes(self) -> Vec<(&'static str, FieldValue)> {
        let mut changes = Vec::new();
        if let Some(v) = self.username {
            changes.push(("username", FieldValue::Text(v)));
        }
        if let Some(v) = self.email {
            changes.push(("email", FieldValue::Text(v)));
        }
        if let Some(v) = self.hashed_password {
            changes.push(("hashed_password", FieldValue::Bytes(v)));
        }
        if let Some(v) = self.is_active {
            changes.push(("is_active", FieldValue::Bool(v)));
        }
        changes
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReadSchema {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for UserReadSchema {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_emits_set_fields() {
        let id = Uuid::new_v4();
        let dto = UserUpdateDTO {
            id,
            is_active: Some(true),
            ..Default::default()
        };
        assert_eq!(dto.id(), id);
        assert_eq!(dto.into_changes(), vec![("is_active", FieldValue::Bool(true))]);
    }

    #[test]
    fn create_dto_carries_generated_id() {
        let dto = UserCreateDTO::new("ann".into(), "ann@example.com".into(), b"hash".to_vec());
        let id = dto.id;
        let values = dto.into_values();
        assert_eq!(values[0], ("id", FieldValue::Uuid(id)));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn read_schema_hides_password() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ann".into(),
            email: "ann@example.com".into(),
            hashed_password: b"secret-hash".to_vec(),
            is_active: false,
        };
        let json = serde_json::to_string(&UserReadSchema::from(user)).unwrap();
        assert!(json.contains("ann@example.com"));
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("hashedPassword"));
    }

    #[test]
    fn create_schema_debug_omits_password() {
        let body: UserCreateSchema = serde_json::from_str(
            r#"{"username":"ann","email":"ann@example.com","password":"hunter22!"}"#,
        )
        .unwrap();
        assert!(!format!("{body:?}").contains("hunter22!"));
    }
}
