//! HTTP plumbing shared by the concrete adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crewdeck_core::Platform;

use crate::error::{ConnectorError, ConnectorResult};

/// Default connect timeout for adapter clients.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout for adapter clients.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a reqwest client with the standard adapter timeouts.
pub fn build_client() -> ConnectorResult<Client> {
    build_client_with_timeout(READ_TIMEOUT)
}

/// Build a reqwest client with a custom read timeout.
pub fn build_client_with_timeout(read_timeout: Duration) -> ConnectorResult<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(read_timeout)
        .build()
        .map_err(|e| {
            ConnectorError::invalid_configuration(format!("failed to build HTTP client: {e}"))
        })
}

/// Map a non-success upstream response to a `ConnectorError`.
///
/// Pulls a human-readable message out of common JSON error shapes
/// before falling back to the raw body.
pub fn error_for_response(platform: Platform, status: StatusCode, body: &str) -> ConnectorError {
    let message = extract_error_message(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ConnectorError::AuthenticationFailed { platform }
        }
        StatusCode::NOT_FOUND => ConnectorError::not_found(message),
        StatusCode::CONFLICT => ConnectorError::conflict(message),
        StatusCode::TOO_MANY_REQUESTS => ConnectorError::RateLimited { message },
        _ => ConnectorError::upstream(status.as_u16(), message),
    }
}

/// Pull a message out of `{"message": …}`, `{"error": …}` or
/// `{"error": {"message": …}}` payloads; otherwise return the body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["message", "detail"] {
            if let Some(msg) = json.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
        if let Some(err) = json.get("error") {
            if let Some(msg) = err.as_str() {
                return msg.to_string();
            }
            if let Some(msg) = err.get("message").and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    if body.is_empty() {
        "upstream returned an empty error body".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = error_for_response(Platform::Video, StatusCode::NOT_FOUND, "{}");
        assert!(err.is_not_found());

        let err = error_for_response(Platform::Telephony, StatusCode::CONFLICT, "{}");
        assert!(err.is_conflict());

        let err = error_for_response(Platform::Video, StatusCode::UNAUTHORIZED, "");
        assert!(matches!(
            err,
            ConnectorError::AuthenticationFailed {
                platform: Platform::Video
            }
        ));
    }

    #[test]
    fn test_extract_message_shapes() {
        assert_eq!(extract_error_message(r#"{"message":"nope"}"#), "nope");
        assert_eq!(extract_error_message(r#"{"error":"bad"}"#), "bad");
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"nested"}}"#),
            "nested"
        );
        assert_eq!(extract_error_message("plain text"), "plain text");
        assert_eq!(
            extract_error_message(""),
            "upstream returned an empty error body"
        );
    }

    #[test]
    fn test_upstream_carries_status_and_message() {
        let err = error_for_response(
            Platform::Crm,
            StatusCode::BAD_GATEWAY,
            r#"{"message":"maintenance"}"#,
        );
        assert_eq!(err.to_string(), "upstream error (502): maintenance");
    }
}
