//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>` only for failures the view
//! cannot absorb (template rendering, session storage). Backend API failures
//! are handled inside the views and rendered as inline messages; they reach
//! this type only when a page cannot be produced at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;

/// Application-level error type for the console.
#[derive(Debug, Error)]
pub enum AppError {
    /// A backend call failed in a way the view could not absorb.
    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if matches!(self, Self::Session(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match &self {
            // An expired backend session means the stored identity is stale;
            // send the user back through login rather than showing an error.
            Self::Backend(api) if api.status() == Some(401) => {
                Redirect::to("/login").into_response()
            }
            Self::Backend(api) => {
                tracing::warn!(error = %api, "Unabsorbed backend failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "The helpdesk service is unavailable".to_owned(),
                )
                    .into_response()
            }
            Self::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("Not found: {what}")).into_response()
            }
            Self::Session(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the logged-in identity.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("ticket 7".to_owned());
        assert_eq!(err.to_string(), "Not found: ticket 7");
    }

    #[test]
    fn test_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Backend(ApiError::Api {
                status: 502,
                message: "down".to_owned()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_stale_backend_session_redirects_to_login() {
        let err = AppError::Backend(ApiError::Api {
            status: 401,
            message: "Authentication required".to_owned(),
        });
        let response = err.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }
}
