//! Ticket route handlers: list, detail, actions, and creation.
//!
//! List state (filters, sort, page) lives entirely in the URL. Every
//! mutation is a form POST that redirects back to the page it came from,
//! which re-fetches from the backend; nothing is patched locally from a
//! mutation response.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use helpdesk_core::{
    Queue, Role, SortField, SortOrder, TicketId, TicketPriority, TicketStatus, UserId,
};

use crate::api::{
    ApiError, AttachmentUpload, Category, NewTicket, Pagination, Ticket, TicketFilters,
    TicketUpdate, User,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentUser, RequireAgent, RequireAuth};
use crate::state::AppState;

/// Maximum accepted attachment size (16 MiB, the backend's own cap).
pub const MAX_ATTACHMENT_BYTES: usize = 16 * 1024 * 1024;

/// Attachment content types the backend accepts.
const ALLOWED_ATTACHMENT_TYPES: &[&str] = &[
    "text/plain",
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/gif",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Fallback category swatch when the backend has no color on record.
const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

// =============================================================================
// Views
// =============================================================================

/// One row of the ticket list, flattened for display.
pub struct TicketRowView {
    pub id: TicketId,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category_name: String,
    pub category_color: String,
    pub creator_name: String,
    pub assignee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl From<&Ticket> for TicketRowView {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            subject: ticket.subject.clone(),
            status: ticket.status,
            priority: ticket.priority,
            category_name: category_name(ticket),
            category_color: category_color(ticket),
            creator_name: creator_name(ticket),
            assignee_name: ticket.assignee.as_ref().map(|a| a.username.clone()),
            created_at: ticket.created_at,
            comment_count: ticket.comment_count,
            upvotes: ticket.upvotes,
            downvotes: ticket.downvotes,
        }
    }
}

/// The full ticket for the detail page.
pub struct TicketDetailView {
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category_name: String,
    pub category_color: String,
    pub creator_name: String,
    pub assignee_name: Option<String>,
    pub assigned_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub attachment_url: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comments: Vec<CommentView>,
}

impl TicketDetailView {
    fn new(ticket: &Ticket, api_url: &str) -> Self {
        Self {
            id: ticket.id,
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            status: ticket.status,
            priority: ticket.priority,
            category_name: category_name(ticket),
            category_color: category_color(ticket),
            creator_name: creator_name(ticket),
            assignee_name: ticket.assignee.as_ref().map(|a| a.username.clone()),
            assigned_to: ticket.assigned_to,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            resolved_at: ticket.resolved_at,
            attachment_url: ticket
                .attachment_path
                .as_deref()
                .map(|path| attachment_url(api_url, path)),
            upvotes: ticket.upvotes,
            downvotes: ticket.downvotes,
            comments: ticket
                .comments
                .iter()
                .flatten()
                .map(CommentView::from)
                .collect(),
        }
    }
}

/// One entry of the comment thread.
pub struct CommentView {
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_internal: bool,
}

impl From<&crate::api::Comment> for CommentView {
    fn from(comment: &crate::api::Comment) -> Self {
        Self {
            author_name: comment
                .author
                .as_ref()
                .map_or_else(|| format!("user #{}", comment.user_id), |a| a.username.clone()),
            content: comment.content.clone(),
            created_at: comment.created_at,
            is_internal: comment.is_internal,
        }
    }
}

/// Current filter selections, stringly typed for the form controls.
pub struct FilterFormView {
    pub search: String,
    pub status: String,
    pub category_id: String,
    pub priority: String,
    pub queue: Queue,
    pub my_tickets: bool,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilterFormView {
    fn new(ticket_filters: &TicketFilters, role: Role) -> Self {
        Self {
            search: ticket_filters.search.clone(),
            status: ticket_filters
                .status
                .map(|s| s.as_str().to_owned())
                .unwrap_or_default(),
            category_id: ticket_filters
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            priority: ticket_filters
                .priority
                .map(|p| p.as_str().to_owned())
                .unwrap_or_default(),
            queue: ticket_filters.queue(),
            my_tickets: ticket_filters.my_tickets(role),
            sort_by: ticket_filters.sort_by(),
            sort_order: ticket_filters.sort_order(),
        }
    }
}

/// One agent queue tab, linking to the current filter state with only the
/// queue swapped (and the page reset).
pub struct QueueTab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

fn queue_tabs(ticket_filters: &TicketFilters, role: Role) -> Vec<QueueTab> {
    [Queue::All, Queue::MyTickets, Queue::Unassigned]
        .into_iter()
        .map(|queue| {
            let mut next = ticket_filters.with_page(1);
            next.queue = Some(queue);
            QueueTab {
                label: queue.label(),
                href: format!("/tickets{}", next.query_string(role)),
                active: ticket_filters.queue() == queue,
            }
        })
        .collect()
}

/// Pagination controls driven by the backend's boundary flags.
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub page: u32,
    pub pages: u32,
    pub total: i64,
}

impl PageLinks {
    pub(crate) fn empty() -> Self {
        Self {
            prev: None,
            next: None,
            page: 1,
            pages: 0,
            total: 0,
        }
    }

    /// Build prev/next links from the backend's boundary flags; `link` turns
    /// a page number into an address with the current filters intact.
    pub(crate) fn from_pagination(pagination: &Pagination, link: impl Fn(u32) -> String) -> Self {
        Self {
            prev: pagination
                .has_prev
                .then(|| link(pagination.page.saturating_sub(1))),
            next: pagination.has_next.then(|| link(pagination.page + 1)),
            page: pagination.page,
            pages: pagination.pages,
            total: pagination.total,
        }
    }

    fn for_tickets(ticket_filters: &TicketFilters, role: Role, pagination: &Pagination) -> Self {
        Self::from_pagination(pagination, |page| {
            format!(
                "/tickets{}",
                ticket_filters.with_page(page).query_string(role)
            )
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Ticket list page template.
#[derive(Template, WebTemplate)]
#[template(path = "tickets/index.html")]
pub struct TicketListTemplate {
    pub user: CurrentUser,
    pub rows: Vec<TicketRowView>,
    pub categories: Vec<Category>,
    pub form: FilterFormView,
    pub links: PageLinks,
    pub statuses: &'static [TicketStatus],
    pub priorities: &'static [TicketPriority],
    pub tabs: Vec<QueueTab>,
    pub sort_fields: &'static [SortField],
    pub error: Option<String>,
}

/// Ticket detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "tickets/show.html")]
pub struct TicketDetailTemplate {
    pub user: CurrentUser,
    pub ticket: TicketDetailView,
    pub agents: Vec<User>,
    pub statuses: &'static [TicketStatus],
    pub can_triage: bool,
    pub can_comment: bool,
    pub error: Option<String>,
}

impl TicketDetailTemplate {
    /// Whether the roster entry is the current assignee (drives the selected
    /// option in the assignment control).
    fn is_assigned(&self, agent: &UserId) -> bool {
        self.ticket.assigned_to.as_ref() == Some(agent)
    }
}

/// Terminal page for a ticket the viewer cannot see.
#[derive(Template, WebTemplate)]
#[template(path = "tickets/not_found.html")]
pub struct TicketNotFoundTemplate {
    pub user: CurrentUser,
}

/// New ticket form template.
#[derive(Template, WebTemplate)]
#[template(path = "tickets/new.html")]
pub struct NewTicketTemplate {
    pub user: CurrentUser,
    pub categories: Vec<Category>,
    pub priorities: &'static [TicketPriority],
    pub error: Option<String>,
    pub subject: String,
    pub description: String,
    pub category_id: String,
    pub priority: String,
}

// =============================================================================
// Query and Form Types
// =============================================================================

/// Query parameters carrying a flash message across a redirect.
#[derive(Debug, Deserialize)]
pub struct FlashQuery {
    pub error: Option<String>,
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: TicketStatus,
}

/// Assignment form data. An empty value unassigns.
#[derive(Debug, Deserialize)]
pub struct AssignForm {
    #[serde(default)]
    pub assigned_to: String,
}

/// Comment form data.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

/// Vote form data: `up`, `down`, or `remove`.
#[derive(Debug, Deserialize)]
pub struct VoteForm {
    pub vote: String,
}

// =============================================================================
// List
// =============================================================================

/// Display the ticket list.
///
/// The category roster for the filter dropdown is best-effort: if it cannot
/// be fetched the list still renders, just without category filtering.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(ticket_filters): Query<TicketFilters>,
) -> Result<Response> {
    let pairs = ticket_filters.to_pairs(user.role);
    let (page_result, categories_result) = tokio::join!(
        state.api().list_tickets(&user.api, &pairs),
        state.api().list_categories(&user.api),
    );

    let categories = categories_result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories for ticket filters");
        Vec::new()
    });
    let form = FilterFormView::new(&ticket_filters, user.role);

    match page_result {
        Ok(page) => Ok(TicketListTemplate {
            rows: page.tickets.iter().map(TicketRowView::from).collect(),
            links: PageLinks::for_tickets(&ticket_filters, user.role, &page.pagination),
            tabs: queue_tabs(&ticket_filters, user.role),
            user,
            categories,
            form,
            statuses: &TicketStatus::ALL,
            priorities: &TicketPriority::ALL,
            sort_fields: &[SortField::CreatedAt, SortField::UpdatedAt, SortField::MostReplied],
            error: None,
        }
        .into_response()),
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load ticket list");
            Ok(TicketListTemplate {
                rows: Vec::new(),
                links: PageLinks::empty(),
                tabs: queue_tabs(&ticket_filters, user.role),
                user,
                categories,
                form,
                statuses: &TicketStatus::ALL,
                priorities: &TicketPriority::ALL,
                sort_fields: &[
                    SortField::CreatedAt,
                    SortField::UpdatedAt,
                    SortField::MostReplied,
                ],
                error: Some(e.user_message()),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Detail
// =============================================================================

/// Display a ticket with its comment thread.
///
/// A ticket the viewer cannot see, whether unknown or simply not theirs,
/// renders the same terminal not-found page.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TicketId>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let ticket = match state.api().get_ticket(&user.api, id).await {
        Ok(ticket) => ticket,
        Err(e) if e.is_not_found() => {
            return Ok(
                (StatusCode::NOT_FOUND, TicketNotFoundTemplate { user }).into_response()
            );
        }
        Err(e) => return Err(e.into()),
    };

    let can_triage = user.role.can_triage();
    let agents = if can_triage {
        state.api().list_agents(&user.api).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load agent roster");
            Vec::new()
        })
    } else {
        Vec::new()
    };

    let can_comment = can_triage || ticket.user_id == user.id;
    let view = TicketDetailView::new(&ticket, &state.config().api_url);

    Ok(TicketDetailTemplate {
        user,
        ticket: view,
        agents,
        statuses: &TicketStatus::ALL,
        can_triage,
        can_comment,
        error: flash.error,
    }
    .into_response())
}

/// Handle a status change (agents and admins).
pub async fn update_status(
    State(state): State<AppState>,
    RequireAgent(user): RequireAgent,
    Path(id): Path<TicketId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let update = TicketUpdate::status(form.status);
    back_to_ticket(id, state.api().update_ticket(&user.api, id, &update).await)
}

/// Handle an assignment change (agents and admins).
pub async fn assign(
    State(state): State<AppState>,
    RequireAgent(user): RequireAgent,
    Path(id): Path<TicketId>,
    Form(form): Form<AssignForm>,
) -> Result<Response> {
    let assignee = if form.assigned_to.is_empty() {
        None
    } else {
        match form.assigned_to.parse::<UserId>() {
            Ok(assignee) => Some(assignee),
            Err(_) => return Ok(flash_redirect(id, "Unknown assignee")),
        }
    };
    let update = TicketUpdate::assignment(assignee);
    back_to_ticket(id, state.api().update_ticket(&user.api, id, &update).await)
}

/// Handle a new comment.
///
/// A blank comment is rejected here; the backend is not called.
pub async fn comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TicketId>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let content = form.content.trim();
    if content.is_empty() {
        return Ok(flash_redirect(id, "Comment cannot be empty"));
    }
    back_to_ticket(id, state.api().add_comment(&user.api, id, content).await)
}

/// Handle an upvote, downvote, or vote withdrawal.
pub async fn vote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TicketId>,
    Form(form): Form<VoteForm>,
) -> Result<Response> {
    let outcome = match form.vote.as_str() {
        "up" => state.api().cast_vote(&user.api, id, true).await,
        "down" => state.api().cast_vote(&user.api, id, false).await,
        "remove" => state.api().remove_vote(&user.api, id).await,
        _ => return Ok(Redirect::to(&format!("/tickets/{id}")).into_response()),
    };
    back_to_ticket(id, outcome)
}

/// Redirect back to a ticket after a mutation, carrying the backend's
/// message on failure. The detail page re-fetches, so the displayed state is
/// always the server's.
fn back_to_ticket(id: TicketId, outcome: std::result::Result<(), ApiError>) -> Result<Response> {
    match outcome {
        Ok(()) => Ok(Redirect::to(&format!("/tickets/{id}")).into_response()),
        Err(e) if e.status() == Some(401) => Err(AppError::from(e)),
        Err(e) => Ok(flash_redirect(id, &e.user_message())),
    }
}

fn flash_redirect(id: TicketId, message: &str) -> Response {
    Redirect::to(&format!("/tickets/{id}?error={}", urlencoding::encode(message)))
        .into_response()
}

// =============================================================================
// Create
// =============================================================================

/// Display the new ticket form.
pub async fn new_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let categories = load_categories(&state, &user).await?;
    Ok(NewTicketTemplate {
        user,
        categories,
        priorities: &TicketPriority::ALL,
        error: None,
        subject: String::new(),
        description: String::new(),
        category_id: String::new(),
        priority: TicketPriority::default().as_str().to_owned(),
    }
    .into_response())
}

/// Raw fields collected from the multipart submission.
#[derive(Default)]
struct RawTicketForm {
    subject: String,
    description: String,
    category_id: String,
    priority: String,
    attachment: Option<AttachmentUpload>,
}

/// Handle new ticket submission.
///
/// Validation failures are rendered without calling the backend; the typed
/// fields survive, the file selection does not.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let mut raw = match read_ticket_form(multipart).await {
        Ok(raw) => raw,
        // A body the server refused to read (typically over the size limit)
        // is a validation failure, not an internal one.
        Err(message) => {
            return render_form_error(&state, user, RawTicketForm::default(), message).await;
        }
    };

    if let Err(message) = validate_ticket_form(&raw) {
        return render_form_error(&state, user, raw, message).await;
    }
    // Checked by validate_ticket_form.
    let Ok(category_id) = raw.category_id.parse() else {
        return render_form_error(&state, user, raw, "Please select a category".to_owned()).await;
    };
    let priority = raw.priority.parse().unwrap_or_default();

    let ticket = NewTicket {
        subject: raw.subject.trim().to_owned(),
        description: raw.description.trim().to_owned(),
        category_id,
        priority,
        attachment: raw.attachment.take(),
    };
    match state.api().create_ticket(&user.api, ticket).await {
        Ok(created) => {
            tracing::info!(ticket_id = %created.id, user_id = %user.id, "Ticket created");
            Ok(Redirect::to(&format!("/tickets/{}", created.id)).into_response())
        }
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => {
            // The attachment was consumed by the request attempt; the typed
            // fields survive.
            let message = e.user_message();
            render_form_error(&state, user, raw, message).await
        }
    }
}

async fn read_ticket_form(
    mut multipart: Multipart,
) -> std::result::Result<RawTicketForm, String> {
    let mut raw = RawTicketForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| upload_error(&e))? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "subject" => raw.subject = read_text(field).await?,
            "description" => raw.description = read_text(field).await?,
            "category_id" => raw.category_id = read_text(field).await?,
            "priority" => raw.priority = read_text(field).await?,
            "attachment" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(|e| upload_error(&e))?;
                // Browsers send an empty part when no file was chosen.
                if !file_name.is_empty() && !bytes.is_empty() {
                    raw.attachment = Some(AttachmentUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(raw)
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
) -> std::result::Result<String, String> {
    field.text().await.map_err(|e| upload_error(&e))
}

/// User-facing message for a multipart body the server refused to read.
fn upload_error(e: &axum::extract::multipart::MultipartError) -> String {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        "Attachment must be 16 MB or smaller".to_owned()
    } else {
        "The upload could not be read. Please try again.".to_owned()
    }
}

fn validate_ticket_form(raw: &RawTicketForm) -> std::result::Result<(), String> {
    if raw.subject.trim().is_empty() {
        return Err("Subject is required".to_owned());
    }
    if raw.description.trim().is_empty() {
        return Err("Description is required".to_owned());
    }
    if raw.category_id.parse::<helpdesk_core::CategoryId>().is_err() {
        return Err("Please select a category".to_owned());
    }
    if let Some(attachment) = &raw.attachment {
        if attachment.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err("Attachment must be 16 MB or smaller".to_owned());
        }
        if !ALLOWED_ATTACHMENT_TYPES.contains(&attachment.content_type.as_str()) {
            return Err("Unsupported attachment type".to_owned());
        }
    }
    Ok(())
}

async fn render_form_error(
    state: &AppState,
    user: CurrentUser,
    raw: RawTicketForm,
    message: String,
) -> Result<Response> {
    let categories = load_categories(state, &user).await?;
    Ok(NewTicketTemplate {
        user,
        categories,
        priorities: &TicketPriority::ALL,
        error: Some(message),
        subject: raw.subject,
        description: raw.description,
        category_id: raw.category_id,
        priority: if raw.priority.is_empty() {
            TicketPriority::default().as_str().to_owned()
        } else {
            raw.priority
        },
    }
    .into_response())
}

async fn load_categories(state: &AppState, user: &CurrentUser) -> Result<Vec<Category>> {
    match state.api().list_categories(&user.api).await {
        Ok(categories) => Ok(categories),
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories");
            Ok(Vec::new())
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn category_name(ticket: &Ticket) -> String {
    ticket
        .category
        .as_ref()
        .map_or_else(|| "Uncategorized".to_owned(), |c| c.name.clone())
}

fn category_color(ticket: &Ticket) -> String {
    ticket
        .category
        .as_ref()
        .and_then(|c| c.color.clone())
        .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_owned())
}

fn creator_name(ticket: &Ticket) -> String {
    ticket
        .creator
        .as_ref()
        .map_or_else(|| format!("user #{}", ticket.user_id), |c| c.username.clone())
}

/// Attachments are served from the backend's static mount, which lives next
/// to (not under) the API prefix.
fn attachment_url(api_url: &str, path: &str) -> String {
    let origin = api_url.trim_end_matches('/').trim_end_matches("/api");
    format!("{origin}/static/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::api::ApiSession;

    fn detail_view(assigned_to: Option<UserId>) -> TicketDetailView {
        TicketDetailView {
            id: TicketId::new(7),
            subject: "Printer is on fire".to_owned(),
            description: "It is literally on fire.".to_owned(),
            status: TicketStatus::Open,
            priority: TicketPriority::Urgent,
            category_name: "Hardware".to_owned(),
            category_color: "#2563EB".to_owned(),
            creator_name: "enduser".to_owned(),
            assignee_name: None,
            assigned_to,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            resolved_at: None,
            attachment_url: None,
            upvotes: 0,
            downvotes: 0,
            comments: Vec::new(),
        }
    }

    fn viewer(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "admin".to_owned(),
            email: "admin@example.com".to_owned(),
            role,
            api: ApiSession::default(),
        }
    }

    #[test]
    fn test_is_assigned_matches_the_current_assignee() {
        let template = TicketDetailTemplate {
            user: viewer(Role::Admin),
            ticket: detail_view(Some(UserId::new(2))),
            agents: Vec::new(),
            statuses: &TicketStatus::ALL,
            can_triage: true,
            can_comment: true,
            error: None,
        };
        assert!(template.is_assigned(&UserId::new(2)));
        assert!(!template.is_assigned(&UserId::new(3)));

        let unassigned = TicketDetailTemplate {
            ticket: detail_view(None),
            ..template
        };
        assert!(!unassigned.is_assigned(&UserId::new(2)));
    }

    #[test]
    fn test_queue_tabs_keep_the_active_filters() {
        let filters: TicketFilters =
            serde_urlencoded::from_str("status=open&search=printer&page=3").expect("parse");
        let tabs = queue_tabs(&filters, Role::SupportAgent);

        assert_eq!(tabs.len(), 3);
        assert!(tabs[0].active, "the default queue tab is active");
        assert_eq!(tabs[0].href, "/tickets?search=printer&status=open");

        let mine = &tabs[1];
        assert!(!mine.active);
        assert!(mine.href.contains("queue=my_tickets"), "{}", mine.href);
        assert!(mine.href.contains("status=open"), "{}", mine.href);
        assert!(mine.href.contains("search=printer"), "{}", mine.href);
        // Switching queues lands back on page 1.
        assert!(!mine.href.contains("page="), "{}", mine.href);
    }

    #[test]
    fn test_attachment_url_strips_api_prefix() {
        assert_eq!(
            attachment_url("http://localhost:5000/api", "uploads/report.pdf"),
            "http://localhost:5000/static/uploads/report.pdf"
        );
        assert_eq!(
            attachment_url("http://localhost:5000/api/", "uploads/report.pdf"),
            "http://localhost:5000/static/uploads/report.pdf"
        );
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let raw = RawTicketForm::default();
        assert_eq!(validate_ticket_form(&raw), Err("Subject is required".to_owned()));

        let raw = RawTicketForm {
            subject: "Printer".to_owned(),
            description: "   ".to_owned(),
            ..RawTicketForm::default()
        };
        assert_eq!(
            validate_ticket_form(&raw),
            Err("Description is required".to_owned())
        );

        let raw = RawTicketForm {
            subject: "Printer".to_owned(),
            description: "On fire".to_owned(),
            category_id: String::new(),
            ..RawTicketForm::default()
        };
        assert_eq!(
            validate_ticket_form(&raw),
            Err("Please select a category".to_owned())
        );
    }

    #[test]
    fn test_validate_attachment_limits() {
        let base = RawTicketForm {
            subject: "Printer".to_owned(),
            description: "On fire".to_owned(),
            category_id: "1".to_owned(),
            priority: "high".to_owned(),
            attachment: None,
        };
        assert_eq!(validate_ticket_form(&base), Ok(()));

        let at_cap = RawTicketForm {
            attachment: Some(AttachmentUpload {
                file_name: "report.pdf".to_owned(),
                content_type: "application/pdf".to_owned(),
                bytes: vec![0; MAX_ATTACHMENT_BYTES],
            }),
            ..base
        };
        assert_eq!(validate_ticket_form(&at_cap), Ok(()));

        let oversized = RawTicketForm {
            subject: "Printer".to_owned(),
            description: "On fire".to_owned(),
            category_id: "1".to_owned(),
            priority: "high".to_owned(),
            attachment: Some(AttachmentUpload {
                file_name: "dump.bin".to_owned(),
                content_type: "application/pdf".to_owned(),
                bytes: vec![0; MAX_ATTACHMENT_BYTES + 1],
            }),
        };
        assert!(validate_ticket_form(&oversized).is_err());

        let bad_type = RawTicketForm {
            subject: "Printer".to_owned(),
            description: "On fire".to_owned(),
            category_id: "1".to_owned(),
            priority: "high".to_owned(),
            attachment: Some(AttachmentUpload {
                file_name: "movie.mkv".to_owned(),
                content_type: "video/x-matroska".to_owned(),
                bytes: vec![0; 16],
            }),
        };
        assert_eq!(
            validate_ticket_form(&bad_type),
            Err("Unsupported attachment type".to_owned())
        );
    }
}
