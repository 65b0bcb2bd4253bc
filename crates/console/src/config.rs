//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HELPDESK_API_URL` - Base URL of the helpdesk REST backend
//!   (e.g. `http://localhost:5000/api`)
//! - `CONSOLE_BASE_URL` - Public URL for the console
//! - `CONSOLE_SESSION_SECRET` - Session signing secret (min 32 chars)
//!
//! ## Optional
//! - `CONSOLE_HOST` - Bind address (default: 127.0.0.1)
//! - `CONSOLE_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Placeholder fragments that indicate a secret was never replaced
/// (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "changeme",
    "example",
    "placeholder",
    "replace",
    "secret",
    "your-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Console application configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the helpdesk REST backend.
    pub api_url: String,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Public base URL for the console.
    pub base_url: String,
    /// Session signing secret.
    pub session_secret: SecretString,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag.
    pub sentry_environment: Option<String>,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("HELPDESK_API_URL")?;
        let host = get_env_or_default("CONSOLE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONSOLE_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("CONSOLE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONSOLE_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("CONSOLE_BASE_URL")?;
        let session_secret = SecretString::from(get_required_env("CONSOLE_SESSION_SECRET")?);
        validate_session_secret(&session_secret, "CONSOLE_SESSION_SECRET")?;

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            session_secret,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the console is served over HTTPS (drives the session
    /// cookie's `Secure` flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that a session secret is long enough and not a leftover
/// placeholder.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST").is_err());
    }

    #[test]
    fn test_session_secret_placeholder() {
        let secret = SecretString::from("changeme-changeme-changeme-changeme");
        let err = validate_session_secret(&secret, "TEST").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_session_secret_valid() {
        let secret = SecretString::from("kQ7vR2mX9bL4tW8nC1pJ5dH3fZ6sY0aG");
        assert!(validate_session_secret(&secret, "TEST").is_ok());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let config = ConsoleConfig {
            api_url: "http://localhost:5000/api".to_owned(),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://helpdesk.internal".to_owned(),
            session_secret: SecretString::from("x".repeat(32)),
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert_eq!(config.socket_addr().port(), 3000);
        assert!(config.is_secure());
    }
}
