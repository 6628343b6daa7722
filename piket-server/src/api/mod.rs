//! HTTP API handlers
//!
//! Handlers are grouped by resource. Access control lives in [`auth`]:
//! `require_session` guards everything except login and health, and
//! `require_admin` additionally guards the management endpoints.

pub mod admin;
pub mod auth;
pub mod completions;
pub mod dashboard;
pub mod groups;
pub mod health;
pub mod recap;
pub mod schedule;
pub mod tasks;
pub mod users;

pub use admin::get_admin_data;
pub use auth::{login, logout, me, require_admin, require_session, Session};
pub use completions::{list_completions, toggle_completion};
pub use dashboard::dashboard_stats;
pub use groups::{create_group, delete_group, list_groups, rename_group};
pub use health::health_routes;
pub use recap::get_recap;
pub use schedule::{get_schedule, update_schedule};
pub use tasks::{create_task, delete_task, list_tasks};
pub use users::{create_user, delete_user, list_users, reset_password, update_user};

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use piket_common::time::parse_date;
use piket_common::Error;

/// Trimmed value of a required body field
pub(crate) fn required_field(value: Option<String>, name: &str) -> ApiResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::validation(format!("{} is required", name))),
    }
}

/// Parse a required `YYYY-MM-DD` query parameter
pub(crate) fn required_date(value: Option<&str>, name: &str) -> ApiResult<NaiveDate> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingParameter(format!("{} is required", name)))?;

    parse_date(raw)
        .ok_or_else(|| Error::MissingParameter(format!("{} must be a YYYY-MM-DD date", name)).into())
}
