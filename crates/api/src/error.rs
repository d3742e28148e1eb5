//! Error rendering for HTTP responses.
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{"error": CODE, "message": ..., "retryable": bool}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bursar_core::ledger::LedgerError;
use bursar_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An application error plus the machine-readable code to report.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    code: &'static str,
}

impl ApiError {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into()).into()
    }

    /// Shorthand for an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into()).into()
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            code: error.error_code(),
            error,
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self {
            code: err.error_code(),
            error: err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = self.error.is_retryable();

        if status.is_server_error() {
            error!(error = %self.error, code = self.code, "Request failed");
        } else if retryable {
            warn!(error = %self.error, code = self.code, "Request conflicted, caller may retry");
        }

        (
            status,
            Json(json!({
                "error": self.code,
                "message": self.error.public_message(),
                "retryable": retryable
            })),
        )
            .into_response()
    }
}
