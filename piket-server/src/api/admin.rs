//! Combined admin panel payload

use axum::{extract::State, Json};
use piket_common::models::{Group, User};
use piket_common::schedule::ScheduleDay;
use serde::Serialize;

use crate::db::{groups, load_schedule, schedule_version, users};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminData {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub schedule: Vec<ScheduleDay>,
    pub schedule_version: i64,
}

/// GET /api/admin/data
pub async fn get_admin_data(State(state): State<AppState>) -> ApiResult<Json<AdminData>> {
    let users = users::list_users(&state.db).await?;
    let groups = groups::list_groups(&state.db).await?;
    let schedule = load_schedule(&state.db).await?;
    let version = schedule_version(&state.db).await?;

    Ok(Json(AdminData {
        users,
        groups,
        schedule: schedule.to_days(),
        schedule_version: version,
    }))
}
