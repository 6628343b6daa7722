//! Dashboard summary for a single day

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::NaiveDate;
use piket_common::time::{parse_date, today};
use serde::Serialize;

use super::completions::DateQuery;
use crate::db::{completions, load_schedule, tasks, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub username: String,
    pub group_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub date: NaiveDate,
    pub total_tasks: i64,
    pub tasks_completed: i64,
    pub groups_on_duty: Vec<String>,
    /// True when the day belongs to the whole household
    pub communal: bool,
    pub all_users: Vec<Member>,
}

/// GET /api/dashboard-stats[?date=YYYY-MM-DD]
///
/// Defaults to the server's local date.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Json<DashboardStats>> {
    let Query(query) = query?;
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_date(raw)
            .ok_or_else(|| ApiError::validation("date must be a YYYY-MM-DD date"))?,
        None => today(),
    };

    let total_tasks = tasks::count_tasks(&state.db).await?;
    let tasks_completed = completions::count_on(&state.db, date).await?;
    let schedule = load_schedule(&state.db).await?;
    let groups_on_duty = schedule.groups_for_date(date).to_vec();
    let communal = groups_on_duty
        .iter()
        .any(|g| g == &state.config.communal_group);

    let all_users = users::list_users(&state.db)
        .await?
        .into_iter()
        .map(|u| Member {
            username: u.username,
            group_name: u.group_name,
        })
        .collect();

    Ok(Json(DashboardStats {
        date,
        total_tasks,
        tasks_completed,
        groups_on_duty,
        communal,
        all_users,
    }))
}
