use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for login.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSchema {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSchema {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairSchema {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenPairSchema {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisteredSchema {
    pub msg: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageSchema {
    pub msg: &'static str,
}
