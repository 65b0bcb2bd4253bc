//! Ticket and user list filter state.
//!
//! Filter state lives in the URL: it is parsed from the request query string
//! and re-encoded into every filter and pagination link. Encoding emits only
//! values that differ from their defaults, so an unfiltered list has a bare
//! address, and re-parsing an encoded query reproduces the same state.
//!
//! The `my_tickets` toggle has a role-dependent default (end users see only
//! their own tickets unless they opt out), so both parsing and encoding take
//! the viewer's role.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use helpdesk_core::{CategoryId, Queue, Role, SortField, SortOrder, TicketPriority, TicketStatus};

/// Deserialize an optional query value, treating an absent or empty string
/// (an unselected form control) as `None`.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

const fn default_page() -> u32 {
    1
}

/// Filter, sort, and pagination state for the ticket list.
///
/// Fields parsed as `None` fall back to their defaults through the accessor
/// methods; handlers never read the raw options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilters {
    /// Free-text search over subject and description.
    #[serde(default)]
    pub search: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub priority: Option<TicketPriority>,
    /// Agent queue selector; ignored for end users.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub queue: Option<Queue>,
    /// End-user "my tickets only" toggle; `None` means the role default.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub my_tickets: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl TicketFilters {
    /// Effective queue selection (agents and admins only).
    #[must_use]
    pub fn queue(&self) -> Queue {
        self.queue.unwrap_or_default()
    }

    /// Effective "my tickets" toggle: end users default to seeing only
    /// their own tickets, agents and admins to seeing everything.
    #[must_use]
    pub fn my_tickets(&self, role: Role) -> bool {
        self.my_tickets.unwrap_or_else(|| role.is_end_user())
    }

    /// Effective sort field.
    #[must_use]
    pub fn sort_by(&self) -> SortField {
        self.sort_by.unwrap_or_default()
    }

    /// Effective sort direction.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// Copy of this state on a different page. Used by pagination links;
    /// filter links always re-encode with page 1 (the filter form simply
    /// carries no page field).
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        let mut next = self.clone();
        next.page = page;
        next
    }

    /// Encode as query pairs, omitting every default-valued dimension.
    ///
    /// The same pairs are sent to the backend and written into links, so the
    /// address bar and the issued request can never disagree.
    #[must_use]
    pub fn to_pairs(&self, role: Role) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id", category_id.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_owned()));
        }
        if role.can_triage() && self.queue() != Queue::All {
            pairs.push(("queue", self.queue().as_str().to_owned()));
        }
        if role.is_end_user() && self.my_tickets(role) != role.is_end_user() {
            pairs.push(("my_tickets", self.my_tickets(role).to_string()));
        }
        if self.sort_by() != SortField::default() {
            pairs.push(("sort_by", self.sort_by().as_str().to_owned()));
        }
        if self.sort_order() != SortOrder::default() {
            pairs.push(("sort_order", self.sort_order().as_str().to_owned()));
        }
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }

    /// Encode as a query string with a leading `?`, or an empty string when
    /// every dimension is at its default.
    #[must_use]
    pub fn query_string(&self, role: Role) -> String {
        encode_pairs(&self.to_pairs(role))
    }
}

/// Filter and pagination state for the user admin list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub role: Option<Role>,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl UserFilters {
    /// Copy of this state on a different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        let mut next = self.clone();
        next.page = page;
        next
    }

    /// Encode as query pairs, omitting defaults.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(role) = self.role {
            pairs.push(("role", role.as_str().to_owned()));
        }
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }

    /// Encode as a query string with a leading `?`, or an empty string.
    #[must_use]
    pub fn query_string(&self) -> String {
        encode_pairs(&self.to_pairs())
    }
}

fn encode_pairs(pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    format!("?{}", serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> TicketFilters {
        serde_urlencoded::from_str(query).expect("parse filters")
    }

    #[test]
    fn test_defaults_encode_to_nothing() {
        let filters = TicketFilters::default();
        assert!(filters.to_pairs(Role::SupportAgent).is_empty());
        assert_eq!(filters.query_string(Role::SupportAgent), "");
        // End-user default (my tickets only) is a default too, so it is
        // omitted as well.
        assert!(filters.to_pairs(Role::EndUser).is_empty());
    }

    #[test]
    fn test_round_trip_preserves_state() {
        let role = Role::SupportAgent;
        let mut filters = TicketFilters::default();
        filters.search = "printer".to_owned();
        filters.status = Some(TicketStatus::InProgress);
        filters.priority = Some(TicketPriority::Urgent);
        filters.queue = Some(Queue::Unassigned);
        filters.sort_by = Some(SortField::MostReplied);
        filters.sort_order = Some(SortOrder::Asc);
        filters.page = 3;

        let query = filters.query_string(role);
        let reparsed = parse(query.trim_start_matches('?'));

        assert_eq!(reparsed.search, "printer");
        assert_eq!(reparsed.status, Some(TicketStatus::InProgress));
        assert_eq!(reparsed.priority, Some(TicketPriority::Urgent));
        assert_eq!(reparsed.queue(), Queue::Unassigned);
        assert_eq!(reparsed.sort_by(), SortField::MostReplied);
        assert_eq!(reparsed.sort_order(), SortOrder::Asc);
        assert_eq!(reparsed.page, 3);
        // Re-encoding the reparsed state yields the same address.
        assert_eq!(reparsed.query_string(role), query);
    }

    #[test]
    fn test_empty_select_values_are_none() {
        let filters = parse("search=&status=&category_id=&priority=&queue=");
        assert_eq!(filters.search, "");
        assert_eq!(filters.status, None);
        assert_eq!(filters.category_id, None);
        assert_eq!(filters.priority, None);
        assert_eq!(filters.queue(), Queue::All);
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_my_tickets_role_default() {
        let filters = TicketFilters::default();
        assert!(filters.my_tickets(Role::EndUser));
        assert!(!filters.my_tickets(Role::SupportAgent));
        assert!(!filters.my_tickets(Role::Admin));

        // An end user opting out of the default is a non-default value and
        // survives the round trip.
        let filters = parse("my_tickets=false");
        assert!(!filters.my_tickets(Role::EndUser));
        let query = filters.query_string(Role::EndUser);
        assert_eq!(query, "?my_tickets=false");
        assert!(!parse(query.trim_start_matches('?')).my_tickets(Role::EndUser));
    }

    #[test]
    fn test_queue_is_not_encoded_for_end_users() {
        let mut filters = TicketFilters::default();
        filters.queue = Some(Queue::Unassigned);
        assert!(filters.to_pairs(Role::EndUser).is_empty());
        assert_eq!(
            filters.to_pairs(Role::Admin),
            vec![("queue", "unassigned".to_owned())]
        );
    }

    #[test]
    fn test_filter_change_resets_page() {
        // The filter form never carries a page field, so any submission
        // parses back to page 1 regardless of where the user was.
        let on_page_five = parse("status=open&page=5");
        assert_eq!(on_page_five.page, 5);
        let after_filter_change = parse("status=closed");
        assert_eq!(after_filter_change.page, 1);
    }

    #[test]
    fn test_with_page_only_changes_page() {
        let filters = parse("status=open&page=2");
        let next = filters.with_page(3);
        assert_eq!(next.status, Some(TicketStatus::Open));
        assert_eq!(next.page, 3);
        assert_eq!(
            next.query_string(Role::Admin),
            "?status=open&page=3"
        );
    }

    #[test]
    fn test_search_is_url_encoded() {
        let mut filters = TicketFilters::default();
        filters.search = "disk full".to_owned();
        let query = filters.query_string(Role::Admin);
        assert_eq!(query, "?search=disk+full");
        assert_eq!(parse(query.trim_start_matches('?')).search, "disk full");
    }

    #[test]
    fn test_user_filters_round_trip() {
        let filters = UserFilters {
            search: "ali".to_owned(),
            role: Some(Role::SupportAgent),
            page: 2,
        };
        let query = filters.query_string();
        let reparsed: UserFilters =
            serde_urlencoded::from_str(query.trim_start_matches('?')).expect("parse");
        assert_eq!(reparsed.search, "ali");
        assert_eq!(reparsed.role, Some(Role::SupportAgent));
        assert_eq!(reparsed.page, 2);
        assert!(UserFilters::default().to_pairs().is_empty());
    }
}
