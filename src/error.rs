//! HTTP-facing error type. Every handler failure ends up here and is
//! rendered as a `{ "error": ... }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Input failed validation; lists every offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for: {}", field_names(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn field_names(fields: &[FieldError]) -> String {
    fields.iter().map(|f| f.field).collect::<Vec<_>>().join(", ")
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failures and anything unexpected. The cause is logged, the
    /// client only sees the public message.
    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            message,
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(v) => json!({
                "error": "Validation failed",
                "fields": v.fields,
            }),
            ApiError::Internal { message, cause } => {
                error!(error = ?cause, "{}", message);
                json!({ "error": message })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
