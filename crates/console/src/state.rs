//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ConsoleConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the backend
/// API client. There is deliberately no other shared mutable state - view
/// state lives in the URL and identity lives in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ConsoleConfig,
    api: ApiClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        let api = ApiClient::new(&config.api_url);
        Self {
            inner: Arc::new(AppStateInner { config, api }),
        }
    }

    /// Get a reference to the console configuration.
    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// Get a reference to the helpdesk backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}
