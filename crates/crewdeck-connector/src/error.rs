//! Connector error types
//!
//! Error definitions with transient/permanent classification. Lookup
//! adapters never surface `NotFound` for an absent account (they return
//! `Ok(None)` instead); the variant exists for the remaining operations
//! where the upstream itself reports the target missing.

use thiserror::Error;

use crewdeck_core::Platform;

/// Error that can occur during a platform adapter operation.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Upstream reports the target resource absent.
    #[error("not found: {identifier}")]
    NotFound { identifier: String },

    /// Credentials rejected by the upstream platform.
    #[error("authentication failed for {platform}")]
    AuthenticationFailed { platform: Platform },

    /// Create/purchase conflict: the resource is already owned.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Upstream rate limit hit.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Adapter configuration is invalid or incomplete.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// No inventory satisfies the request (e.g. no numbers for a prefix).
    #[error("resource exhausted: {message}")]
    ResourceExhausted { message: String },

    /// Any other upstream failure, carrying the upstream message.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level failure before an HTTP status was received.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream call exceeded its time budget.
    #[error("timeout after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl ConnectorError {
    /// Check if this error is transient and the operation may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::Network { .. }
            | ConnectorError::Timeout { .. }
            | ConnectorError::RateLimited { .. } => true,
            ConnectorError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this error is an already-owned/already-exists conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConnectorError::Conflict { .. })
    }

    /// Check if this error reports the target resource absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnectorError::NotFound { .. })
    }

    // Convenience constructors

    /// Create a not-found error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        ConnectorError::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ConnectorError::Conflict {
            message: message.into(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a resource-exhausted error.
    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        ConnectorError::ResourceExhausted {
            message: message.into(),
        }
    }

    /// Create a network error without a source.
    pub fn network(message: impl Into<String>) -> Self {
        ConnectorError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with a source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an upstream error.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        ConnectorError::Upstream {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConnectorError::Timeout {
                seconds: crate::http::READ_TIMEOUT.as_secs(),
            }
        } else {
            ConnectorError::network_with_source(err.to_string(), err)
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient = vec![
            ConnectorError::network("connection reset"),
            ConnectorError::Timeout { seconds: 30 },
            ConnectorError::RateLimited {
                message: "slow down".to_string(),
            },
        ];
        for err in transient {
            assert!(err.is_transient(), "expected {err} to be transient");
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent = vec![
            ConnectorError::not_found("user@example.com"),
            ConnectorError::AuthenticationFailed {
                platform: Platform::Video,
            },
            ConnectorError::conflict("number already owned"),
            ConnectorError::invalid_configuration("missing api key"),
        ];
        for err in permanent {
            assert!(!err.is_transient(), "expected {err} to be permanent");
        }
    }

    #[test]
    fn test_conflict_classification() {
        assert!(ConnectorError::conflict("owned").is_conflict());
        assert!(!ConnectorError::upstream(500, "boom").is_conflict());
        assert!(ConnectorError::not_found("x").is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ConnectorError::upstream(502, "bad gateway");
        assert_eq!(err.to_string(), "upstream error (502): bad gateway");

        let err = ConnectorError::Timeout { seconds: 25 };
        assert_eq!(err.to_string(), "timeout after 25 seconds");
    }
}
