use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::users::repo::StoreError;
use crate::validation::FieldErrors;

/// Failure surfaced over HTTP. Every variant renders the same envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{field} already exists")]
    Duplicate { field: String, value: String },

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    #[error("server error: {0}")]
    Server(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl AppError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), reason.into());
        Self::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Duplicate { .. } | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Duplicate { .. } => "duplicate",
            AppError::Validation(_) => "validation",
            AppError::Auth(_) => "auth",
            AppError::NotFound(_) => "not_found",
            AppError::Server(_) => "server",
        }
    }

    fn body(self) -> ErrorBody {
        let kind = self.kind();
        let mut body = ErrorBody {
            success: false,
            kind,
            message: String::new(),
            field: None,
            value: None,
            errors: None,
        };
        match self {
            AppError::Duplicate { field, value } => {
                body.message = format!("{field} already exists");
                body.field = Some(field);
                body.value = Some(value);
            }
            AppError::Validation(errors) => {
                body.message = errors
                    .values()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                body.errors = Some(errors);
            }
            AppError::Auth(msg) | AppError::NotFound(msg) => body.message = msg,
            AppError::Server(e) => {
                error!(error = %e, "internal error");
                body.message = "Server error".into();
            }
        }
        body
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { field, value } => AppError::Duplicate { field, value },
            StoreError::Validation(errors) => AppError::Validation(errors),
            StoreError::NotFound => AppError::NotFound("User not found".into()),
            StoreError::Backend(e) => AppError::Server(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(status = %rejection.status(), "rejected request body");
        AppError::validation("body", rejection.body_text())
    }
}

/// `Json` body extractor that rejects with the failure envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
