//! DTOs for the helpdesk REST backend.
//!
//! These mirror the backend's JSON shapes exactly. Payloads are deserialized
//! as-is and never validated client-side; nested entities the backend may
//! omit (`creator`, `assignee`, `category`, `comments`) are `Option` so every
//! caller handles absence explicitly instead of falling back to a blank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use helpdesk_core::{
    CategoryId, CommentId, Role, TicketId, TicketPriority, TicketStatus, UserId,
};

/// A helpdesk account as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// A ticket category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Hex display color, e.g. `#6B7280`.
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Derived by the backend from the tickets referencing this category.
    pub ticket_count: i64,
}

/// A comment on a ticket. Append-only, owned by the ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_internal: bool,
    pub ticket_id: TicketId,
    pub user_id: UserId,
    pub author: Option<User>,
}

/// A support ticket.
///
/// List responses omit `comments`; the detail endpoint includes them in
/// creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Path under the backend's `/static/` mount, linked directly.
    pub attachment_path: Option<String>,
    /// Creator account ID.
    pub user_id: UserId,
    pub assigned_to: Option<UserId>,
    pub category_id: CategoryId,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comment_count: i64,
    pub creator: Option<User>,
    pub assignee: Option<User>,
    pub category: Option<Category>,
    #[serde(default)]
    pub comments: Option<Vec<Comment>>,
}

/// Server-authoritative pagination descriptor.
///
/// Boundary decisions come from `has_prev`/`has_next`, never from comparing
/// page numbers locally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Account totals from `GET /users/stats`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub end_users: i64,
    pub support_agents: i64,
    pub admins: i64,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Credentials for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Profile for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/change-password`.
#[derive(Debug, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Fields for `POST /tickets`. Sent as multipart; the attachment part is
/// present only when a file was uploaded.
#[derive(Debug)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub category_id: CategoryId,
    pub priority: TicketPriority,
    pub attachment: Option<AttachmentUpload>,
}

/// An uploaded file forwarded to the backend verbatim.
#[derive(Debug)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Partial update for `PUT /tickets/{id}`.
///
/// Only set fields are serialized, so a status change never carries an
/// assignment and vice versa. `assigned_to` is doubly optional: the outer
/// level means "include this field", the inner `None` unassigns.
#[derive(Debug, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<UserId>>,
}

impl TicketUpdate {
    /// Update carrying only a status change.
    #[must_use]
    pub const fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            assigned_to: None,
        }
    }

    /// Update carrying only an assignment change (`None` unassigns).
    #[must_use]
    pub const fn assignment(assignee: Option<UserId>) -> Self {
        Self {
            status: None,
            assigned_to: Some(assignee),
        }
    }
}

/// Fields for category create/update.
#[derive(Debug, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Partial update for `PUT /users/{id}`.
#[derive(Debug, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// =============================================================================
// Response envelopes
// =============================================================================

/// `GET /tickets` response.
#[derive(Debug, Deserialize)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub pagination: Pagination,
}

/// `GET /users` response.
#[derive(Debug, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TicketEnvelope {
    pub ticket: Ticket,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesEnvelope {
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryEnvelope {
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AgentsEnvelope {
    pub agents: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsEnvelope {
    pub stats: UserStats,
}

/// Error payload the backend sends on non-success responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_update_serializes_only_set_fields() {
        let update = TicketUpdate::status(TicketStatus::Resolved);
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "status": "resolved" }));

        let update = TicketUpdate::assignment(Some(UserId::new(3)));
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "assigned_to": 3 }));

        // Unassignment sends an explicit null, not an absent field.
        let update = TicketUpdate::assignment(None);
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json, serde_json::json!({ "assigned_to": null }));
    }

    #[test]
    fn test_ticket_deserializes_without_comments() {
        let json = serde_json::json!({
            "id": 1,
            "subject": "Printer on fire",
            "description": "It is literally on fire.",
            "status": "open",
            "priority": "urgent",
            "created_at": "2026-01-05T10:00:00Z",
            "updated_at": "2026-01-05T10:00:00Z",
            "resolved_at": null,
            "attachment_path": null,
            "user_id": 2,
            "assigned_to": null,
            "category_id": 1,
            "upvotes": 0,
            "downvotes": 0,
            "comment_count": 0,
            "creator": null,
            "assignee": null,
            "category": null
        });
        let ticket: Ticket = serde_json::from_value(json).expect("deserialize");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.comments.is_none());
        assert!(ticket.category.is_none());
    }
}
