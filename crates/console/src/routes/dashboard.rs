//! Dashboard route handler.
//!
//! Status counts come from the pagination totals of per-status queries with
//! a page size of one, so they are exact without pulling ticket bodies. The
//! scope follows the viewer's role defaults: end users see their own
//! tickets, agents and admins see everything.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use helpdesk_core::TicketStatus;

use crate::api::{ApiError, ApiSession};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CurrentUser, RequireAuth};
use crate::state::AppState;

use super::tickets::TicketRowView;

/// Number of recent tickets shown.
const RECENT_TICKETS: u32 = 10;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: CurrentUser,
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
    pub recent: Vec<TicketRowView>,
    pub error: Option<String>,
}

/// Display the dashboard.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let recent_pairs = [("per_page", RECENT_TICKETS.to_string())];
    let (recent, total, open, in_progress, resolved, closed) = tokio::join!(
        state.api().list_tickets(&user.api, &recent_pairs),
        count(&state, &user.api, None),
        count(&state, &user.api, Some(TicketStatus::Open)),
        count(&state, &user.api, Some(TicketStatus::InProgress)),
        count(&state, &user.api, Some(TicketStatus::Resolved)),
        count(&state, &user.api, Some(TicketStatus::Closed)),
    );

    let recent = match recent {
        Ok(page) => page.tickets.iter().map(TicketRowView::from).collect(),
        Err(e) if e.status() == Some(401) => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load dashboard");
            return Ok(DashboardTemplate {
                user,
                total: 0,
                open: 0,
                in_progress: 0,
                resolved: 0,
                closed: 0,
                recent: Vec::new(),
                error: Some(e.user_message()),
            }
            .into_response());
        }
    };

    Ok(DashboardTemplate {
        user,
        total: count_or_zero(total),
        open: count_or_zero(open),
        in_progress: count_or_zero(in_progress),
        resolved: count_or_zero(resolved),
        closed: count_or_zero(closed),
        recent,
        error: None,
    }
    .into_response())
}

/// Total matching tickets for a status, via the pagination descriptor of a
/// single-item page.
async fn count(
    state: &AppState,
    auth: &ApiSession,
    status: Option<TicketStatus>,
) -> std::result::Result<i64, ApiError> {
    let mut pairs = vec![("per_page", "1".to_owned())];
    if let Some(status) = status {
        pairs.push(("status", status.as_str().to_owned()));
    }
    let page = state.api().list_tickets(auth, &pairs).await?;
    Ok(page.pagination.total)
}

fn count_or_zero(outcome: std::result::Result<i64, ApiError>) -> i64 {
    outcome
        .map_err(|e| tracing::warn!(error = %e, "Failed to load a dashboard count"))
        .unwrap_or(0)
}
