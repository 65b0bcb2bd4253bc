//! Helpdesk Core - Shared types library.
//!
//! This crate provides common types used across the Helpdesk Console:
//! - `console` - The web console over the helpdesk REST backend
//! - `integration-tests` - End-to-end tests against the console router
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Entity IDs
//! are backend-issued integers wrapped in newtypes so a `TicketId` can never
//! be passed where a `UserId` is expected; the role and status enums are
//! exhaustive so guard logic fails to compile when a variant is added.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
