//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Formats a backend timestamp for display, e.g. "Jan 5, 2026 10:32".
///
/// Usage in templates: `{{ ticket.created_at|datetime }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn datetime(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%b %-d, %Y %H:%M").to_string())
}

/// Formats a backend timestamp as a date only, e.g. "Jan 5, 2026".
///
/// Usage in templates: `{{ user.created_at|date }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn date(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%b %-d, %Y").to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
