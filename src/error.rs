use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::{response::ApiResponse, users::StoreError};

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

pub const EMAIL_IN_USE: FieldError = FieldError {
    field: "email",
    message: "E-mail already in use",
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation Error.")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Request timed out.")]
    Timeout,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // lost the race against a concurrent registration
            StoreError::DuplicateEmail => Self::Validation(vec![EMAIL_IN_USE]),
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".into())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(errors) => {
                ApiResponse::failure(status, "Validation Error.", Some(errors)).into_response()
            }
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                ApiResponse::<()>::failure(status, "Internal server error.", None).into_response()
            }
            other => ApiResponse::<()>::failure(status, other.to_string(), None).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_every_field_error() {
        let (status, body) = render(AppError::Validation(vec![
            FieldError { field: "name", message: "Name must be specified." },
            FieldError { field: "email", message: "Email must be specified." },
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation Error.");
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][0]["field"], "name");
    }

    #[tokio::test]
    async fn unauthorized_keeps_its_message() {
        let (status, body) = render(AppError::unauthorized("Invalid or expired token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
        assert_eq!(body["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn duplicate_insert_reads_as_uniqueness_failure() {
        let (status, body) = render(StoreError::DuplicateEmail.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"][0]["message"], "E-mail already in use");
    }

    #[tokio::test]
    async fn internal_errors_are_opaque() {
        let (status, body) =
            render(AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error.");
    }
}
