//! Client for the helpdesk REST backend.
//!
//! # Architecture
//!
//! - One method per backend operation, nothing else: no caching, no retry,
//!   no client-side shape validation beyond deserialization.
//! - The backend authenticates with a session cookie. [`ApiSession`] carries
//!   the cookie pairs captured at login/register and is attached to every
//!   authenticated call.
//! - Non-success responses become [`ApiError::Api`] with the backend's
//!   `{error}` message and status code; transport failures become
//!   [`ApiError::Network`] with no status.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk_console::api::ApiClient;
//!
//! let client = ApiClient::new("http://localhost:5000/api");
//! let (user, session) = client.login(&credentials).await?;
//! let page = client.list_tickets(&session, &filters.to_pairs(user.role)).await?;
//! ```

mod client;
pub mod query;
pub mod types;

pub use client::{ApiClient, ApiSession};
pub use query::{TicketFilters, UserFilters};
pub use types::*;

use thiserror::Error;

/// Errors raised by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection,
    /// timeout). No status code is available.
    #[error("helpdesk backend unreachable: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend rejected the operation. `message` is surfaced to the
    /// user verbatim.
    #[error("{message}")]
    Api {
        /// HTTP status code of the rejection.
        status: u16,
        /// Backend-supplied error message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response from helpdesk backend: {0}")]
    Parse(String),
}

impl ApiError {
    /// Status code of the failure, if the backend produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(_) | Self::Parse(_) => None,
        }
    }

    /// Whether the backend answered 404 (or 403, which the ticket views
    /// fold into the same terminal "not found" state).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 403 | 404, .. })
    }

    /// Message suitable for inline display in a view.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Network(_) => "Could not reach the helpdesk service. Please try again.".to_owned(),
            Self::Parse(_) => "The helpdesk service returned an unexpected response.".to_owned(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_is_verbatim() {
        let err = ApiError::Api {
            status: 403,
            message: "Insufficient permissions".to_owned(),
        };
        assert_eq!(err.to_string(), "Insufficient permissions");
        assert_eq!(err.user_message(), "Insufficient permissions");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_not_found_covers_forbidden() {
        for status in [403, 404] {
            let err = ApiError::Api {
                status,
                message: "Ticket not found".to_owned(),
            };
            assert!(err.is_not_found());
        }
        let err = ApiError::Api {
            status: 409,
            message: "conflict".to_owned(),
        };
        assert!(!err.is_not_found());
    }
}
