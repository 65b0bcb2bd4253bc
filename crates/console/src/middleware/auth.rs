//! Authentication extractors and session identity storage.
//!
//! The console keeps a snapshot of the logged-in user in its own session,
//! alongside the backend session cookie it replays on every API call. Route
//! guards are expressed as extractors: a handler that takes [`RequireAuth`]
//! can only run with an authenticated user, [`RequireAgent`] and
//! [`RequireAdmin`] additionally gate on role.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use helpdesk_core::{Role, UserId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::api::{ApiSession, User};

/// Session key for the current user snapshot.
const CURRENT_USER_KEY: &str = "current_user";

/// The logged-in identity stored in the console session.
///
/// Captured at login from the backend's user payload; refreshed whenever the
/// profile changes. The `api` field holds the backend session cookie that
/// authenticates API calls made on this user's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub api: ApiSession,
}

impl CurrentUser {
    /// Build a session snapshot from a backend user payload.
    #[must_use]
    pub fn from_user(user: &User, api: ApiSession) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            api,
        }
    }
}

/// Store the current user in the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CURRENT_USER_KEY, user).await
}

/// Remove the current user from the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(CURRENT_USER_KEY).await?;
    Ok(())
}

/// Read the current user from the session, if any.
async fn load_current_user(session: &Session) -> Option<CurrentUser> {
    session.get::<CurrentUser>(CURRENT_USER_KEY).await.ok()?
}

/// Rejection for the auth extractors: a redirect to the appropriate page.
#[derive(Debug)]
pub enum GuardRejection {
    /// No authenticated user; go log in.
    Login,
    /// Authenticated but under-privileged; back to the dashboard.
    Dashboard,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Login => Redirect::to("/login").into_response(),
            Self::Dashboard => Redirect::to("/dashboard").into_response(),
        }
    }
}

/// Extractor that requires an authenticated user.
///
/// Redirects to `/login` if no user is logged in.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| GuardRejection::Login)?;
        load_current_user(&session)
            .await
            .map(Self)
            .ok_or(GuardRejection::Login)
    }
}

/// Extractor that yields the current user if one is logged in.
///
/// Never rejects; used by pages that adapt to authentication state, such
/// as the login page redirecting authenticated visitors away.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await else {
            return Ok(Self(None));
        };
        Ok(Self(load_current_user(&session).await))
    }
}

/// Extractor that requires a support agent or administrator.
///
/// Redirects to `/login` when anonymous and to `/dashboard` when the user
/// cannot triage tickets.
#[derive(Debug, Clone)]
pub struct RequireAgent(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAgent
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if user.role.can_triage() {
            Ok(Self(user))
        } else {
            Err(GuardRejection::Dashboard)
        }
    }
}

/// Extractor that requires an administrator.
///
/// Redirects to `/login` when anonymous and to `/dashboard` otherwise.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if user.role.is_admin() {
            Ok(Self(user))
        } else {
            Err(GuardRejection::Dashboard)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn test_guard_rejection_redirects() {
        let response = GuardRejection::Login.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/login")
        );

        let response = GuardRejection::Dashboard.into_response();
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/dashboard")
        );
    }

    #[test]
    fn test_current_user_from_user() {
        let user = User {
            id: UserId::new(3),
            username: "agent".to_owned(),
            email: "agent@example.com".to_owned(),
            role: Role::SupportAgent,
            created_at: chrono::Utc::now(),
            is_active: true,
        };
        let current = CurrentUser::from_user(&user, ApiSession::default());
        assert_eq!(current.id, UserId::new(3));
        assert!(current.role.can_triage());
    }
}
