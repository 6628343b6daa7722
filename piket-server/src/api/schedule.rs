//! Weekly duty schedule endpoints
//!
//! Every saved change bumps a version counter so clients holding an older
//! copy can tell their view is stale.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use piket_common::db::{bump_schedule_version, replace_schedule};
use piket_common::schedule::{DutySchedule, ScheduleDay};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{groups, load_schedule, schedule_version};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub version: i64,
    pub communal_group: String,
    pub schedule: Vec<ScheduleDay>,
}

/// GET /api/schedule
pub async fn get_schedule(State(state): State<AppState>) -> ApiResult<Json<ScheduleResponse>> {
    let schedule = load_schedule(&state.db).await?;
    let version = schedule_version(&state.db).await?;

    Ok(Json(ScheduleResponse {
        version,
        communal_group: state.config.communal_group.clone(),
        schedule: schedule.to_days(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub schedule: Vec<ScheduleDay>,
}

/// PUT /api/admin/schedule
///
/// Replaces the whole roster. Weekdays left out of the body become days
/// without duty.
pub async fn update_schedule(
    State(state): State<AppState>,
    payload: Result<Json<UpdateScheduleRequest>, JsonRejection>,
) -> ApiResult<Json<ScheduleResponse>> {
    let Json(req) = payload?;
    let schedule = DutySchedule::from_days(&req.schedule)?;

    let known: Vec<String> = groups::list_groups(&state.db)
        .await?
        .into_iter()
        .map(|g| g.name)
        .collect();
    let communal = &state.config.communal_group;
    if let Some(unknown) = schedule
        .group_names()
        .into_iter()
        .find(|name| *name != communal.as_str() && !known.iter().any(|k| k.as_str() == *name))
    {
        return Err(ApiError::validation(format!("Unknown group '{}'", unknown)));
    }

    let mut tx = state.db.begin().await?;
    replace_schedule(&mut *tx, &schedule).await?;
    let version = bump_schedule_version(&mut *tx).await?;
    tx.commit().await?;

    info!("Duty schedule updated to version {}", version);

    Ok(Json(ScheduleResponse {
        version,
        communal_group: communal.clone(),
        schedule: schedule.to_days(),
    }))
}
