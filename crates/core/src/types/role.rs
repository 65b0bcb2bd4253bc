//! User roles and the capabilities they grant.

use serde::{Deserialize, Serialize};

/// Role held by a helpdesk account.
///
/// The backend stores exactly one role per user. Capability checks go
/// through the predicate methods below rather than comparing strings, so
/// adding a role forces every guard to be revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Files tickets and comments on their own tickets.
    EndUser,
    /// Triages tickets: status, assignment, comments on any ticket.
    SupportAgent,
    /// Everything an agent can do, plus category and account management.
    Admin,
}

impl Role {
    /// All roles, least privileged first (for select controls).
    pub const ALL: [Self; 3] = [Self::EndUser, Self::SupportAgent, Self::Admin];

    /// Whether this role may change ticket status and assignment, work the
    /// agent queues, and comment on any ticket.
    #[must_use]
    pub const fn can_triage(self) -> bool {
        match self {
            Self::SupportAgent | Self::Admin => true,
            Self::EndUser => false,
        }
    }

    /// Whether this role may manage categories and user accounts.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        match self {
            Self::Admin => true,
            Self::SupportAgent | Self::EndUser => false,
        }
    }

    /// Whether this role is a plain end user (drives the "my tickets only"
    /// default on the ticket list).
    #[must_use]
    pub const fn is_end_user(self) -> bool {
        match self {
            Self::EndUser => true,
            Self::SupportAgent | Self::Admin => false,
        }
    }

    /// Wire value as sent by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndUser => "end_user",
            Self::SupportAgent => "support_agent",
            Self::Admin => "admin",
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EndUser => "End User",
            Self::SupportAgent => "Support Agent",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end_user" => Ok(Self::EndUser),
            "support_agent" => Ok(Self::SupportAgent),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(!Role::EndUser.can_triage());
        assert!(Role::SupportAgent.can_triage());
        assert!(Role::Admin.can_triage());

        assert!(Role::Admin.is_admin());
        assert!(!Role::SupportAgent.is_admin());

        assert!(Role::EndUser.is_end_user());
        assert!(!Role::Admin.is_end_user());
    }

    #[test]
    fn test_wire_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
