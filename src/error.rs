use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::db::naming;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", not_found_message(.model, .id.as_deref()))]
    NotFound {
        model: &'static str,
        id: Option<String>,
    },

    /// A unique field already holds the submitted value.
    #[error("{message}")]
    AlreadyExists { field: String, message: String },

    #[error("{message}")]
    Validation { fields: Vec<String>, message: String },

    #[error("Sorting field not found: {0}")]
    SortingFieldNotFound(String),

    #[error("Filtering field not found: {0}")]
    FilteringFieldNotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn not_found_message(model: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Unable to find the {model} with id {id}."),
        None => format!("{model} id not found."),
    }
}

impl AppError {
    pub fn not_found(model: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            model,
            id: Some(id.to_string()),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            fields: vec![field.into()],
            message: message.into(),
        }
    }

    pub fn already_exists(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AlreadyExists { .. } => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SortingFieldNotFound(_) | AppError::FilteringFieldNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Unique constraints follow `uq_{table}_{column}`, so the column can be recovered.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                if let Some((_, field)) = db_err.constraint().and_then(naming::parse_unique) {
                    return AppError::already_exists(
                        field,
                        format!("A record with this {field} already exists"),
                    );
                }
            }
        }
        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::AlreadyExists { field, message } => {
                json!({ "detail": message, "field": field })
            }
            AppError::Validation { fields, message } => {
                json!({ "detail": message, "field": fields })
            }
            AppError::Database(e) => {
                error!(error = %e, "database error");
                json!({ "detail": "Internal server error" })
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                json!({ "detail": "Internal server error" })
            }
            other => json!({ "detail": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
