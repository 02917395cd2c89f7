//! Error body shared by the session and catalog endpoints.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::SupportError;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }

    pub fn internal() -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: "Internal server error".to_string(),
            details: None,
        }
    }
}

/// API error that implements IntoResponse.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::bad_request(message),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::not_found(resource_type, id),
        }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse::internal(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.body.code
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::SessionNotFound | ErrorCode::PackageNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidStateTransition
        | ErrorCode::InputNotAccepted
        | ErrorCode::ReplyPending
        | ErrorCode::RatingAlreadySubmitted => StatusCode::CONFLICT,
        ErrorCode::AIProviderError => StatusCode::BAD_GATEWAY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = status_for(err.code());
        if status.is_server_error() {
            return ApiError::internal(err);
        }
        let details = (!err.details.is_empty())
            .then(|| serde_json::to_value(&err.details).ok())
            .flatten();
        Self {
            status,
            body: ErrorResponse {
                code: err.code().to_string(),
                message: err.message,
                details,
            },
        }
    }
}

impl From<SupportError> for ApiError {
    fn from(err: SupportError) -> Self {
        match err {
            SupportError::SessionNotFound(id) => {
                let mut api = ApiError::not_found("Session", &id.to_string());
                api.body.code = ErrorCode::SessionNotFound.to_string();
                api
            }
            SupportError::Domain(err) => err.into(),
            SupportError::Store(err) => ApiError::internal(err),
            err @ SupportError::Interrupted(_) => ApiError::internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
