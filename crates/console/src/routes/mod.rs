//! HTTP route handlers for the helpdesk console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the dashboard
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Registration page
//! POST /register               - Registration action
//! POST /logout                 - Logout action
//! GET  /profile                - Profile page
//! POST /profile/password       - Change password
//!
//! # Dashboard
//! GET  /dashboard              - Status counts and recent tickets
//!
//! # Tickets
//! GET  /tickets                - Ticket list (filters in the query string)
//! GET  /tickets/new            - New ticket form
//! POST /tickets                - Create ticket (multipart)
//! GET  /tickets/{id}           - Ticket detail with comment thread
//! POST /tickets/{id}/status    - Change status (agents and admins)
//! POST /tickets/{id}/assign    - Change assignment (agents and admins)
//! POST /tickets/{id}/comments  - Add a comment
//! POST /tickets/{id}/vote      - Cast or withdraw a vote
//!
//! # Category admin (admins only)
//! GET  /admin/categories                 - Category list
//! GET  /admin/categories/new             - New category form
//! POST /admin/categories                 - Create category
//! GET  /admin/categories/{id}/edit       - Edit form
//! POST /admin/categories/{id}            - Update category
//! GET  /admin/categories/{id}/delete     - Deletion confirmation
//! POST /admin/categories/{id}/delete     - Delete category
//!
//! # User admin (admins only)
//! GET  /admin/users                      - User list with account totals
//! POST /admin/users/{id}/role            - Change role
//! POST /admin/users/{id}/activate        - Activate account
//! POST /admin/users/{id}/deactivate      - Deactivate account
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod tickets;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Body limit for ticket creation, well above the attachment cap so an
/// oversized file is read in full and rejected with the inline form message
/// rather than aborting the multipart stream.
const CREATE_BODY_LIMIT: usize = tickets::MAX_ATTACHMENT_BYTES * 2;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route("/profile/password", post(auth::change_password))
}

/// Create the ticket routes router.
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(tickets::index)
                .post(tickets::create)
                .layer(DefaultBodyLimit::max(CREATE_BODY_LIMIT)),
        )
        .route("/new", get(tickets::new_ticket))
        .route("/{id}", get(tickets::show))
        .route("/{id}/status", post(tickets::update_status))
        .route("/{id}/assign", post(tickets::assign))
        .route("/{id}/comments", post(tickets::comment))
        .route("/{id}/vote", post(tickets::vote))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/new", get(categories::new_category))
        .route(
            "/categories/{id}",
            post(categories::update),
        )
        .route("/categories/{id}/edit", get(categories::edit))
        .route(
            "/categories/{id}/delete",
            get(categories::confirm_delete).post(categories::delete),
        )
        .route("/users", get(users::index))
        .route("/users/{id}/role", post(users::change_role))
        .route("/users/{id}/activate", post(users::activate))
        .route("/users/{id}/deactivate", post(users::deactivate))
}

/// Create all routes for the console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/health", get(|| async { "OK" }))
        .route("/dashboard", get(dashboard::index))
        .nest("/tickets", ticket_routes())
        .nest("/admin", admin_routes())
        .merge(auth_routes())
}
