//! HTTP error type for piket-server
//!
//! Every handler returns `ApiResult<T>`; failures are turned into a JSON body
//! `{"error": <message>, "code": <CODE>}` with a status derived from the
//! variant. Server-side failures are logged here so handlers don't have to.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use piket_common::Error;
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::{error, warn};

/// API error type
#[derive(Debug, ThisError)]
pub enum ApiError {
    /// Domain or storage failure from piket-common
    #[error(transparent)]
    Common(#[from] Error),

    /// Body was not valid JSON for the endpoint
    #[error("Invalid request body: {0}")]
    Body(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Common(Error::Validation(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Common(Error::PermissionDenied(msg.into()))
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Common(Error::Auth(msg.into()))
    }

    /// Status code and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Body(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Common(err) => match err {
                Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                Error::MissingParameter(_) => (StatusCode::BAD_REQUEST, "MISSING_PARAMETER"),
                Error::InvalidRange { .. } => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
                Error::Auth(_) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
                Error::PermissionDenied(_) => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
                Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
                Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::Body(msg) => format!("Invalid request body: {}", msg),
            ApiError::Common(Error::Database(_)) => "Storage error".to_string(),
            ApiError::Common(err) => err.to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Common(Error::Database(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Common(Error::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Common(Error::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": self.client_message(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
