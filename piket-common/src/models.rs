//! Row and view models shared by the server and the reconciler

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Role that may manage users, groups, tasks and the schedule
pub const ROLE_SUPERADMIN: &str = "superadmin";
/// Ordinary household member
pub const ROLE_USER: &str = "user";

/// Check a role string against the known roles
pub fn is_valid_role(role: &str) -> bool {
    role == ROLE_SUPERADMIN || role == ROLE_USER
}

/// Chore in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Duty group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Group {
    pub name: String,
}

/// User as exposed over the API (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub group_name: String,
    pub role: String,
}

impl User {
    pub fn is_superadmin(&self) -> bool {
        self.role == ROLE_SUPERADMIN
    }
}

/// A task checked off for one day, joined with the completer's identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Completion {
    pub id: i64,
    pub task_id: i64,
    pub date: NaiveDate,
    pub user_id: i64,
    pub username: String,
    pub group_name: String,
}
