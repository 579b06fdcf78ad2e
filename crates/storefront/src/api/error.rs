//! Backend API error type.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::forms::{BackendFieldError, FieldErrors};

/// Errors that can occur when calling the backend REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the input.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Backend message or truncated body.
        message: String,
    },

    /// A URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the error means the backend is unreachable or failing, as
    /// opposed to a problem with the request.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<BackendFieldError>,
}

/// Maximum number of body characters kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Map a non-success response to an [`ApiError`].
pub(crate) fn error_from_response(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    what: &str,
) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .as_deref()
        .unwrap_or(body)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect::<String>();

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound(what.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(retry_after.unwrap_or(1)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let mut errors: FieldErrors = parsed.errors.into_iter().collect();
            if errors.is_empty() {
                errors.add_form(if message.is_empty() {
                    "The request was rejected".to_string()
                } else {
                    message
                });
            }
            ApiError::Validation(errors)
        }
        _ => ApiError::Status { status, message },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_auth_statuses() {
        assert!(matches!(
            error_from_response(StatusCode::UNAUTHORIZED, None, "", "x"),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            error_from_response(StatusCode::FORBIDDEN, None, "", "x"),
            ApiError::Forbidden
        ));
    }

    #[test]
    fn test_maps_not_found_with_context() {
        let err = error_from_response(StatusCode::NOT_FOUND, None, "{}", "product p1");
        assert_eq!(err.to_string(), "Not found: product p1");
    }

    #[test]
    fn test_maps_rate_limit_default() {
        assert!(matches!(
            error_from_response(StatusCode::TOO_MANY_REQUESTS, None, "", "x"),
            ApiError::RateLimited(1)
        ));
        assert!(matches!(
            error_from_response(StatusCode::TOO_MANY_REQUESTS, Some(30), "", "x"),
            ApiError::RateLimited(30)
        ));
    }

    #[test]
    fn test_maps_validation_errors() {
        let body = r#"{"message":"Invalid","errors":[{"field":"slug","message":"taken"}]}"#;
        let ApiError::Validation(errors) =
            error_from_response(StatusCode::UNPROCESSABLE_ENTITY, None, body, "x")
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors.first("slug"), Some("taken"));
    }

    #[test]
    fn test_validation_without_field_errors_uses_message() {
        let body = r#"{"message":"Email already registered"}"#;
        let ApiError::Validation(errors) =
            error_from_response(StatusCode::BAD_REQUEST, None, body, "x")
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors.first("_form"), Some("Email already registered"));
    }

    #[test]
    fn test_other_status_truncates_body() {
        let body = "x".repeat(500);
        let err = error_from_response(StatusCode::BAD_GATEWAY, None, &body, "x");
        let ApiError::Status { status, message } = &err else {
            panic!("expected status error");
        };
        assert_eq!(*status, StatusCode::BAD_GATEWAY);
        assert_eq!(message.len(), 200);
        assert!(err.is_server_error());
    }

    #[test]
    fn test_other_status_truncates_json_message() {
        let body = serde_json::json!({ "message": "y".repeat(500) }).to_string();
        let ApiError::Status { message, .. } =
            error_from_response(StatusCode::SERVICE_UNAVAILABLE, None, &body, "x")
        else {
            panic!("expected status error");
        };
        assert_eq!(message, "y".repeat(200));
    }
}
