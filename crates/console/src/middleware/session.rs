//! Session middleware configuration.
//!
//! Sessions are held in memory: the console never persists anything beyond
//! the active session, so there is no database-backed store. The session
//! carries only the [`CurrentUser`](crate::middleware::CurrentUser) snapshot
//! and the backend's own session cookie.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ConsoleConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "helpdesk_session";

/// Session expiry on inactivity (8 hours - a working day).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ConsoleConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
