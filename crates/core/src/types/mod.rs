//! Core types for the Helpdesk Console.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod query;
pub mod role;
pub mod status;

pub use id::*;
pub use query::{Queue, SortField, SortOrder};
pub use role::Role;
pub use status::{TicketPriority, TicketStatus};
