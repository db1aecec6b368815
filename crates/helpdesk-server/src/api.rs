//! Shared error type for the HTTP handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use helpdesk_tools::{BackendError, FailureReason, ToolFailure};
use helpdesk_types::api::ErrorResponse;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected input; `reason` is the machine-readable code.
    #[error("invalid input ({reason}): {message}")]
    BadRequest {
        reason: &'static str,
        message: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("voice disabled: {0}")]
    VoiceDisabled(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            reason: "invalid_request",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason, message) = match self {
            ApiError::BadRequest { reason, message } => (StatusCode::BAD_REQUEST, reason, message),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::VoiceDisabled(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "voice_disabled", msg)
            }
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            reason: reason.to_string(),
            error: message,
        });

        (status, body).into_response()
    }
}

impl From<ToolFailure> for ApiError {
    fn from(failure: ToolFailure) -> Self {
        match failure.reason {
            FailureReason::UnsupportedIssue => ApiError::BadRequest {
                reason: "unsupported_issue",
                message: failure.message,
            },
            FailureReason::InvalidField => ApiError::BadRequest {
                reason: "invalid_field",
                message: failure.message,
            },
            FailureReason::MissingField | FailureReason::InvalidArguments => {
                ApiError::bad_request(failure.message)
            }
            FailureReason::NotFound => ApiError::NotFound(failure.message),
            // Already logged with full context at the tool boundary.
            FailureReason::BackendUnavailable => ApiError::InternalServerError(failure.message),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        tracing::error!(error = %err, "ticket store operation failed");
        ApiError::InternalServerError("ticket store unavailable".to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failures_keep_their_reason() {
        let err = ApiError::from(ToolFailure::new(FailureReason::InvalidField, "nope"));
        assert!(matches!(
            err,
            ApiError::BadRequest {
                reason: "invalid_field",
                ..
            }
        ));

        let err = ApiError::from(ToolFailure::not_found());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_field_is_a_plain_bad_request() {
        let err = ApiError::from(ToolFailure::new(FailureReason::MissingField, "need phone"));
        assert!(matches!(
            err,
            ApiError::BadRequest {
                reason: "invalid_request",
                ..
            }
        ));
    }
}
