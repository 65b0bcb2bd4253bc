//! Integration test harness for the helpdesk console.
//!
//! Spins up two in-process servers on ephemeral ports: a fake helpdesk
//! backend serving canned JSON, and the real console router pointed at it.
//! Tests drive the console over HTTP with a cookie-carrying client and
//! assert on redirects, rendered pages, and what the backend was asked.
//!
//! Accounts known to the fake backend (password is always `secret`):
//! `enduser` (end user, id 3), `agent` (support agent, id 2), and
//! `admin` (admin, id 1).

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde_json::{Value, json};

use helpdesk_console::config::ConsoleConfig;
use helpdesk_console::middleware::create_session_layer;
use helpdesk_console::routes;
use helpdesk_console::state::AppState;

/// Everything the fake backend records about the requests it served, plus
/// the switches tests flip to provoke failures.
#[derive(Debug, Default)]
pub struct BackendRecord {
    pub logout_calls: usize,
    pub create_ticket_calls: usize,
    pub list_ticket_queries: Vec<String>,
    pub last_ticket_update: Option<Value>,
    /// Current status of ticket 7, reflected by the detail endpoint.
    pub ticket_status: Option<String>,
    /// When set, `POST /auth/logout` answers 500.
    pub fail_logout: bool,
}

/// Shared handle to the fake backend's record.
#[derive(Clone, Default)]
pub struct Backend {
    record: Arc<Mutex<BackendRecord>>,
}

impl Backend {
    /// Run `f` against the record under the lock.
    pub fn with_record<T>(&self, f: impl FnOnce(&mut BackendRecord) -> T) -> T {
        let mut record = self.record.lock().expect("backend record poisoned");
        f(&mut record)
    }
}

/// Start the fake backend; returns its handle and the API base URL to hand
/// to the console.
pub async fn spawn_backend() -> (Backend, String) {
    let backend = Backend::default();
    let router = backend_router(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind backend listener");
    let addr = listener.local_addr().expect("backend addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("backend serve");
    });

    (backend, format!("http://{addr}/api"))
}

/// Start the console pointed at `api_url`; returns its base URL.
pub async fn spawn_console(api_url: &str) -> String {
    let config = ConsoleConfig {
        api_url: api_url.to_owned(),
        host: "127.0.0.1".parse().expect("host"),
        port: 0,
        base_url: "http://console.test".to_owned(),
        session_secret: SecretString::from("kQ7vR2mX9bL4tW8nC1pJ5dH3fZ6sY0aG"),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let session_layer = create_session_layer(&config);
    let app = Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(AppState::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind console listener");
    let addr: SocketAddr = listener.local_addr().expect("console addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("console serve");
    });

    format!("http://{addr}")
}

/// Start both servers; returns the backend handle and the console base URL.
pub async fn spawn_stack() -> (Backend, String) {
    let (backend, api_url) = spawn_backend().await;
    let console_url = spawn_console(&api_url).await;
    (backend, console_url)
}

/// HTTP client that carries cookies but never follows redirects, so tests
/// see every `Location` header.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build client")
}

/// Log `username` in through the console; panics unless the console answers
/// with the post-login redirect.
pub async fn login(client: &reqwest::Client, console_url: &str, username: &str) {
    let resp = client
        .post(format!("{console_url}/login"))
        .form(&[("username", username), ("password", "secret")])
        .send()
        .await
        .expect("login request");
    assert!(
        resp.status().is_redirection(),
        "login for {username} did not redirect: {}",
        resp.status()
    );
    assert_eq!(location(&resp), Some("/dashboard".to_owned()));
}

/// The `Location` header of a response, if any.
pub fn location(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

// =============================================================================
// Fake backend
// =============================================================================

fn backend_router(backend: Backend) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth_login))
        .route("/api/auth/logout", post(auth_logout))
        .route("/api/tickets", get(list_tickets).post(create_ticket))
        .route("/api/tickets/{id}", get(get_ticket).put(update_ticket))
        .route("/api/tickets/{id}/comments", post(ok_json))
        .route("/api/tickets/{id}/vote", post(ok_json).delete(ok_json))
        .route("/api/categories", get(list_categories))
        .route("/api/users", get(list_users))
        .route("/api/users/agents", get(list_agents))
        .route("/api/users/stats", get(user_stats))
        .with_state(backend)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn require_session(headers: &HeaderMap) -> Result<(), Response> {
    let authed = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookie| cookie.contains("session=backend-session"));
    if authed {
        Ok(())
    } else {
        Err(error_body(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
        ))
    }
}

fn user_json(username: &str) -> Value {
    let (id, role) = match username {
        "admin" => (1, "admin"),
        "agent" => (2, "support_agent"),
        _ => (3, "end_user"),
    };
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "role": role,
        "created_at": "2026-01-05T10:00:00Z",
        "is_active": true,
    })
}

fn category_json() -> Value {
    json!({
        "id": 1,
        "name": "Hardware",
        "description": "Physical equipment",
        "color": "#2563EB",
        "is_active": true,
        "created_at": "2026-01-05T10:00:00Z",
        "ticket_count": 1,
    })
}

fn ticket_json(status: &str) -> Value {
    json!({
        "id": 7,
        "subject": "Printer is on fire",
        "description": "It is literally on fire.",
        "status": status,
        "priority": "urgent",
        "created_at": "2026-01-05T10:00:00Z",
        "updated_at": "2026-01-05T10:00:00Z",
        "resolved_at": null,
        "attachment_path": null,
        "user_id": 3,
        "assigned_to": null,
        "category_id": 1,
        "upvotes": 1,
        "downvotes": 0,
        "comment_count": 0,
        "creator": user_json("enduser"),
        "assignee": null,
        "category": category_json(),
        "comments": [],
    })
}

/// A ticket owned by the agent account, for permission checks from other
/// viewpoints.
fn foreign_ticket_json() -> Value {
    json!({
        "id": 8,
        "subject": "Keyboard missing keys",
        "description": "The E key is gone.",
        "status": "open",
        "priority": "low",
        "created_at": "2026-01-06T09:00:00Z",
        "updated_at": "2026-01-06T09:00:00Z",
        "resolved_at": null,
        "attachment_path": null,
        "user_id": 2,
        "assigned_to": null,
        "category_id": 1,
        "upvotes": 0,
        "downvotes": 0,
        "comment_count": 0,
        "creator": user_json("agent"),
        "assignee": null,
        "category": category_json(),
        "comments": [],
    })
}

fn pagination_json() -> Value {
    json!({
        "page": 1,
        "per_page": 10,
        "total": 1,
        "pages": 1,
        "has_prev": false,
        "has_next": false,
    })
}

async fn auth_login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default();
    let known = matches!(username.as_str(), "admin" | "agent" | "enduser");
    if !known || password != "secret" {
        return error_body(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }
    (
        [(
            header::SET_COOKIE,
            format!("session=backend-session-{username}; Path=/; HttpOnly"),
        )],
        Json(json!({ "user": user_json(&username) })),
    )
        .into_response()
}

async fn auth_logout(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    let fail = backend.with_record(|r| {
        r.logout_calls += 1;
        r.fail_logout
    });
    if fail {
        error_body(StatusCode::INTERNAL_SERVER_ERROR, "Session store unavailable")
    } else {
        Json(json!({ "message": "Logged out" })).into_response()
    }
}

async fn list_tickets(
    State(backend): State<Backend>,
    headers: HeaderMap,
    uri: axum::http::Uri,
) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    let status = backend.with_record(|r| {
        r.list_ticket_queries
            .push(uri.query().unwrap_or_default().to_owned());
        r.ticket_status.clone()
    });
    let status = status.unwrap_or_else(|| "open".to_owned());
    Json(json!({
        "tickets": [ticket_json(&status)],
        "pagination": pagination_json(),
    }))
    .into_response()
}

async fn create_ticket(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    backend.with_record(|r| r.create_ticket_calls += 1);
    let status = backend
        .with_record(|r| r.ticket_status.clone())
        .unwrap_or_else(|| "open".to_owned());
    (
        StatusCode::CREATED,
        Json(json!({ "ticket": ticket_json(&status) })),
    )
        .into_response()
}

async fn get_ticket(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    if id == 8 {
        return Json(json!({ "ticket": foreign_ticket_json() })).into_response();
    }
    if id != 7 {
        return error_body(StatusCode::NOT_FOUND, "Ticket not found");
    }
    let status = backend
        .with_record(|r| r.ticket_status.clone())
        .unwrap_or_else(|| "open".to_owned());
    Json(json!({ "ticket": ticket_json(&status) })).into_response()
}

async fn update_ticket(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    if id != 7 {
        return error_body(StatusCode::NOT_FOUND, "Ticket not found");
    }
    backend.with_record(|r| {
        if let Some(status) = body["status"].as_str() {
            r.ticket_status = Some(status.to_owned());
        }
        r.last_ticket_update = Some(body.clone());
    });
    Json(json!({ "message": "Ticket updated" })).into_response()
}

async fn ok_json(headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    Json(json!({ "message": "ok" })).into_response()
}

async fn list_categories(headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    Json(json!({ "categories": [category_json()] })).into_response()
}

async fn list_users(headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    Json(json!({
        "users": [user_json("admin"), user_json("agent"), user_json("enduser")],
        "pagination": pagination_json(),
    }))
    .into_response()
}

async fn list_agents(headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    Json(json!({ "agents": [user_json("agent")] })).into_response()
}

async fn user_stats(headers: HeaderMap) -> Response {
    if let Err(resp) = require_session(&headers) {
        return resp;
    }
    Json(json!({
        "stats": {
            "total_users": 3,
            "active_users": 3,
            "inactive_users": 0,
            "end_users": 1,
            "support_agents": 1,
            "admins": 1,
        }
    }))
    .into_response()
}
