//! Ticket list query dimensions: agent queue, sort field, sort direction.

use serde::{Deserialize, Serialize};

/// Agent-facing queue filter on the ticket list.
///
/// Only meaningful for agents and admins; end users filter with the
/// "my tickets" toggle instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    /// Every ticket visible to the caller.
    #[default]
    All,
    /// Tickets assigned to the caller.
    MyTickets,
    /// Tickets with no assignee.
    Unassigned,
}

impl Queue {
    /// Wire value as used in the `queue` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::MyTickets => "my_tickets",
            Self::Unassigned => "unassigned",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Tickets",
            Self::MyTickets => "My Tickets",
            Self::Unassigned => "Unassigned",
        }
    }
}

impl std::str::FromStr for Queue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "my_tickets" => Ok(Self::MyTickets),
            "unassigned" => Ok(Self::Unassigned),
            _ => Err(format!("invalid queue: {s}")),
        }
    }
}

/// Field the ticket list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Creation time (the backend default).
    #[default]
    CreatedAt,
    /// Last update time.
    UpdatedAt,
    /// Reply count.
    MostReplied,
}

impl SortField {
    /// Wire value as used in the `sort_by` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::MostReplied => "most_replied",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreatedAt => "Created Date",
            Self::UpdatedAt => "Last Modified",
            Self::MostReplied => "Most Replied",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "most_replied" => Ok(Self::MostReplied),
            _ => Err(format!("invalid sort field: {s}")),
        }
    }
}

/// Direction of the ticket list sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Wire value as used in the `sort_order` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_roundtrip() {
        for queue in [Queue::All, Queue::MyTickets, Queue::Unassigned] {
            assert_eq!(queue.as_str().parse::<Queue>(), Ok(queue));
        }
    }

    #[test]
    fn test_sort_defaults() {
        assert_eq!(SortField::default(), SortField::CreatedAt);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(Queue::default(), Queue::All);
    }
}
