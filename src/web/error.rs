//! API error handling.
//!
//! Every failure leaves the server as `{success: false, code, message}`.
//! Infrastructure failures are logged here and reach the client only as a
//! generic message.

use std::collections::HashMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::intake::{IntakeError, IntakeErrorKind};
use crate::PortalError;

/// Message returned for storage failures during upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";

/// Message returned for any other server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request itself is unacceptable (400). Never worth retrying.
    ValidationError,
    /// A JSON body failed field rules (422).
    InvalidFields,
    /// Missing or stale admin session (401).
    Unauthorized,
    /// `Origin` not in the allow-list (403).
    OriginRejected,
    /// No such record or file (404).
    NotFound,
    /// Storing an upload failed (500). May succeed on retry.
    IntakeFailed,
    /// Anything else on our side (500).
    InternalError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFields => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::OriginRejected => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::IntakeFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Field name to the messages of every rule it broke.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// Error returned from handlers and extractors.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn origin_rejected() -> Self {
        Self::new(ErrorCode::OriginRejected, "CORS policy: Origin not allowed")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Generic 500. Log the cause before returning this.
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, INTERNAL_ERROR_MESSAGE)
    }

    /// 422 carrying every broken field rule.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let details: FieldErrors = errors
            .field_errors()
            .into_iter()
            .map(|(field, rules)| {
                let messages = rules
                    .iter()
                    .map(|rule| match &rule.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value for {field}"),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self {
            code: ErrorCode::InvalidFields,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&FieldErrors> {
        self.details.as_ref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            message: self.message,
            details: self.details,
        };
        (self.code.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::Auth(msg) => ApiError::unauthorized(msg),
            PortalError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            PortalError::Validation(msg) => ApiError::bad_request(msg),
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::internal()
            }
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err.kind() {
            IntakeErrorKind::Validation => ApiError::bad_request(err.to_string()),
            IntakeErrorKind::IntakeFailed => {
                tracing::error!(error = %err, "Upload could not be stored");
                ApiError::new(ErrorCode::IntakeFailed, UPLOAD_FAILED_MESSAGE)
            }
        }
    }
}
