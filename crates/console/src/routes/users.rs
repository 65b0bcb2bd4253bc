//! User administration route handlers (admin only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use helpdesk_core::{Role, UserId};

use crate::api::{User, UserFilters, UserStats, UserUpdate};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::state::AppState;

use super::tickets::PageLinks;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Role change form data.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: Role,
}

/// Query parameters carrying a flash message across a redirect.
#[derive(Debug, Deserialize)]
pub struct FlashQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// User admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UserListTemplate {
    pub user: CurrentUser,
    pub users: Vec<User>,
    pub stats: Option<UserStats>,
    pub search: String,
    pub role_filter: String,
    pub roles: &'static [Role],
    pub links: PageLinks,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the user list with account totals.
///
/// The stats are best-effort: a failed stats fetch drops the summary cards
/// but keeps the list.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(user_filters): Query<UserFilters>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let pairs = user_filters.to_pairs();
    let (page_result, stats_result) = tokio::join!(
        state.api().list_users(&user.api, &pairs),
        state.api().user_stats(&user.api),
    );

    let stats = stats_result
        .map_err(|e| tracing::warn!(error = %e, "Failed to load user stats"))
        .ok();
    let search = user_filters.search.clone();
    let role_filter = user_filters
        .role
        .map(|r| r.as_str().to_owned())
        .unwrap_or_default();

    match page_result {
        Ok(page) => Ok(UserListTemplate {
            user,
            users: page.users,
            stats,
            search,
            role_filter,
            roles: &Role::ALL,
            links: PageLinks::from_pagination(&page.pagination, |page| {
                format!("/admin/users{}", user_filters.with_page(page).query_string())
            }),
            error: flash.error,
            success: flash.success,
        }
        .into_response()),
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => Ok(UserListTemplate {
            user,
            users: Vec::new(),
            stats,
            search,
            role_filter,
            roles: &Role::ALL,
            links: PageLinks::empty(),
            error: Some(e.user_message()),
            success: None,
        }
        .into_response()),
    }
}

/// Handle a role change.
pub async fn change_role(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Result<Response> {
    let update = UserUpdate {
        role: Some(form.role),
        is_active: None,
    };
    let outcome = state.api().update_user(&user.api, id, &update).await.map(|_| ());
    back_to_users(outcome, "Role updated")
}

/// Handle account activation.
pub async fn activate(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    back_to_users(
        state.api().activate_user(&user.api, id).await,
        "Account activated",
    )
}

/// Handle account deactivation.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Response> {
    back_to_users(
        state.api().deactivate_user(&user.api, id).await,
        "Account deactivated",
    )
}

/// Redirect back to the user list after a mutation; the list re-fetches, so
/// it shows whatever the backend actually recorded.
fn back_to_users(
    outcome: std::result::Result<(), crate::api::ApiError>,
    success: &str,
) -> Result<Response> {
    match outcome {
        Ok(()) => Ok(Redirect::to(&format!(
            "/admin/users?success={}",
            urlencoding::encode(success)
        ))
        .into_response()),
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => Ok(Redirect::to(&format!(
            "/admin/users?error={}",
            urlencoding::encode(&e.user_message())
        ))
        .into_response()),
    }
}
