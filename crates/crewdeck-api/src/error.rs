//! API error type and response mapping.
//!
//! Errors serialize as `{"success": false, "error": "…"}`. Gate and
//! validation failures surface before any upstream call as 4xx; caught
//! upstream errors inside orchestration never reach this type (they are
//! data in the progress report), so a 500 here means a pre-flight read
//! or the request itself failed. Error messages pass through verbatim
//! for operator debugging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crewdeck_connector::ConnectorError;
use crewdeck_provisioning::{OffboardError, OnboardError};

/// Error type for the HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller input malformed.
    #[error("{0}")]
    Validation(String),

    /// Target resource not found.
    #[error("{0}")]
    NotFound(String),

    /// A destructive operation's preconditions are not met.
    #[error("{0}")]
    SafetyGate(String),

    /// Upstream or unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

/// The `{success: false, error}` failure envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SafetyGate(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "request rejected");
        }
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConnectorError> for ApiError {
    fn from(err: ConnectorError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<OnboardError> for ApiError {
    fn from(err: OnboardError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<OffboardError> for ApiError {
    fn from(err: OffboardError) -> Self {
        match err {
            OffboardError::InvalidIdentifier(_) => ApiError::Validation(err.to_string()),
            OffboardError::NotFound(_) => ApiError::NotFound(err.to_string()),
            OffboardError::DomainMismatch(_) => ApiError::SafetyGate(err.to_string()),
            OffboardError::Connector(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("missing".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::SafetyGate("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_offboard_error_mapping() {
        let err: ApiError = OffboardError::InvalidIdentifier("x".into()).into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = OffboardError::DomainMismatch("y".into()).into();
        assert!(matches!(err, ApiError::SafetyGate(_)));

        let err: ApiError = OffboardError::NotFound("z".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
