//! Middleware: sessions and authentication guards.

pub mod auth;
pub mod session;

pub use auth::{
    clear_current_user, set_current_user, CurrentUser, GuardRejection, OptionalAuth, RequireAdmin,
    RequireAgent, RequireAuth,
};
pub use session::create_session_layer;
