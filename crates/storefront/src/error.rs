//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before a sanitized response is sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::services::cart_session::CartSessionError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Guest cart session handling failed.
    #[error("Cart session error: {0}")]
    CartSession(#[from] CartSessionError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Response extension telling the session middleware that the backend no
/// longer accepts the stored token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

impl AppError {
    /// Whether this error is the server's fault rather than the request's.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_error(),
            Self::CartSession(_) | Self::Session(_) | Self::Internal(_) => true,
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => match err {
                ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                ApiError::Forbidden => StatusCode::FORBIDDEN,
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ApiError::Status { status, .. } if status.is_client_error() => *status,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::CartSession(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Api(err) => match err {
                ApiError::Unauthorized => "Please sign in again".to_string(),
                ApiError::Forbidden => "You do not have access to this page".to_string(),
                ApiError::NotFound(what) => format!("Not found: {what}"),
                ApiError::Validation(errors) => errors.to_string(),
                ApiError::RateLimited(secs) => {
                    format!("Too many requests, try again in {secs} seconds")
                }
                ApiError::Status { status, message } if status.is_client_error() => {
                    message.clone()
                }
                _ => "The store is temporarily unavailable".to_string(),
            },
            Self::CartSession(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Forbidden => "You do not have access to this page".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // An expired token sends the visitor back to the login page.
        if matches!(self, Self::Api(ApiError::Unauthorized)) {
            let mut response = Redirect::to("/auth/login").into_response();
            response.extensions_mut().insert(SessionExpired);
            return response;
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product p1".to_string());
        assert_eq!(err.to_string(), "Not found: product p1");
    }

    #[test]
    fn test_local_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status_of(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            status_of(ApiError::NotFound("brand b1".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Forbidden.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ApiError::RateLimited(5).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(
                ApiError::Status {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "down".to_string(),
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_expired_token_redirects_and_marks_response() {
        let response = AppError::from(ApiError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }
}
