use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{header::ALLOW, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::db::StoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Every error a handler can return. The body is always `{ "error": "<message>" }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Duplicate email")]
    DuplicateEmail,

    #[error("Please enter correct id")]
    InvalidId,

    #[error("Invalid Email or Password")]
    InvalidCredentials,

    #[error("Missing Authorization header with Bearer token")]
    MissingCredentials,

    #[error("Authentication Failed")]
    AuthenticationFailed,

    #[error("User authentication failed")]
    AuthenticationError,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail | AppError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::AuthenticationFailed => {
                StatusCode::UNAUTHORIZED
            }
            // ownership mismatch answers 401, not 403
            AppError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            AppError::MissingCredentials => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::AuthenticationError | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Rewrites the router's bare 405 into the JSON error shape, keeping `Allow`.
pub async fn method_not_allowed_json(res: Response) -> Response {
    if res.status() != StatusCode::METHOD_NOT_ALLOWED {
        return res;
    }
    let allow = res.headers().get(ALLOW).cloned();
    let mut out = AppError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        out.headers_mut().insert(ALLOW, allow);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_api_contract() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AppError::validation("Please enter all values"), StatusCode::BAD_REQUEST),
            (AppError::DuplicateEmail, StatusCode::BAD_REQUEST),
            (AppError::InvalidId, StatusCode::BAD_REQUEST),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::AuthenticationFailed, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("nope".into()), StatusCode::UNAUTHORIZED),
            (AppError::MissingCredentials, StatusCode::FORBIDDEN),
            (AppError::not_found("Job not found"), StatusCode::NOT_FOUND),
            (AppError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (AppError::AuthenticationError, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Internal(anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let response = AppError::Internal(anyhow::anyhow!("password for db is hunter2")).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }
}
