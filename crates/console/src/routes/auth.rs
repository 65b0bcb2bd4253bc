//! Authentication route handlers.
//!
//! Login, registration, logout, and the profile page with password change.
//! Backend rejections are rendered inline with the backend's own message;
//! transport failures get a generic one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::{Credentials, NewAccount, PasswordChange};
use crate::error::{clear_sentry_user, set_sentry_user, Result};
use crate::filters;
use crate::middleware::{
    clear_current_user, set_current_user, CurrentUser, OptionalAuth, RequireAuth,
};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Password change form data.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Query parameters for success-message display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub username: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub user: CurrentUser,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page. Authenticated visitors are sent to the dashboard.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    LoginTemplate {
        error: None,
        success: query.success,
        username: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = Credentials {
        username: form.username.clone(),
        password: form.password,
    };
    match state.api().login(&credentials).await {
        Ok((user, api_session)) => {
            let current = CurrentUser::from_user(&user, api_session);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, Some(&current.username));
            tracing::info!(user_id = %current.id, "User logged in");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => {
            tracing::warn!(username = %form.username, error = %e, "Login rejected");
            Ok(LoginTemplate {
                error: Some(e.user_message()),
                success: None,
                username: form.username,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page. Authenticated visitors are sent to the
/// dashboard.
pub async fn register_page(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    RegisterTemplate {
        error: None,
        username: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// A password confirmation mismatch is rejected here without touching the
/// backend; everything else is the backend's call.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form.password != form.password_confirm {
        return Ok(RegisterTemplate {
            error: Some("Passwords do not match".to_owned()),
            username: form.username,
            email: form.email,
        }
        .into_response());
    }

    let account = NewAccount {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password,
    };
    match state.api().register(&account).await {
        Ok((user, api_session)) => {
            // Registration logs the new account in.
            let current = CurrentUser::from_user(&user, api_session);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, Some(&current.username));
            tracing::info!(user_id = %current.id, "Account registered");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => {
            tracing::warn!(username = %form.username, error = %e, "Registration rejected");
            Ok(RegisterTemplate {
                error: Some(e.user_message()),
                username: form.username,
                email: form.email,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// The backend call is best-effort: local session state is cleared even when
/// the backend rejects or is unreachable, so the user is never stuck
/// logged in.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    if let Err(e) = state.api().logout(&user.api).await {
        tracing::warn!(user_id = %user.id, error = %e, "Backend logout failed");
    }
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(Redirect::to("/login").into_response())
}

// =============================================================================
// Profile
// =============================================================================

/// Display the profile page.
///
/// The identity is re-fetched from the backend so the page (and the session
/// snapshot) reflect server-side changes, such as an admin editing the role.
/// A stale backend session bubbles up and lands on the login page; any other
/// failure falls back to the stored snapshot.
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let user = match state.api().current_user(&user.api).await {
        Ok(fresh) => {
            let refreshed = CurrentUser::from_user(&fresh, user.api);
            set_current_user(&session, &refreshed).await?;
            refreshed
        }
        Err(e) if e.status() == Some(401) => return Err(e.into()),
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Identity refresh failed");
            user
        }
    };
    Ok(ProfileTemplate {
        user,
        error: None,
        success: query.success,
    }
    .into_response())
}

/// Handle password change form submission.
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    if form.new_password != form.new_password_confirm {
        return Ok(ProfileTemplate {
            user,
            error: Some("New passwords do not match".to_owned()),
            success: None,
        }
        .into_response());
    }

    let change = PasswordChange {
        current_password: form.current_password,
        new_password: form.new_password,
    };
    match state.api().change_password(&user.api, &change).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "Password changed");
            Ok(Redirect::to("/profile?success=Password+changed").into_response())
        }
        Err(e) => Ok(ProfileTemplate {
            user,
            error: Some(e.user_message()),
            success: None,
        }
        .into_response()),
    }
}
