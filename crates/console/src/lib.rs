//! Helpdesk console library.
//!
//! This crate provides the console functionality as a library, allowing it
//! to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
