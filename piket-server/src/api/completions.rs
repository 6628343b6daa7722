//! Completion marks for a task on a date
//!
//! Marking is an upsert keyed on (task, date), so the latest marker owns the
//! row. Un-marking only removes a row the caller owns. Members may only touch
//! days their group is on duty; superadmins may touch any day.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    Extension, Json,
};
use piket_common::time::parse_date;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{required_date, required_field, Session};
use crate::db::{completions, load_schedule};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// GET /api/completions?date=YYYY-MM-DD
pub async fn list_completions(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let date = required_date(query.date.as_deref(), "date")?;
    let completions = completions::completions_on(&state.db, date).await?;
    Ok(Json(json!({ "completions": completions })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub task_id: Option<i64>,
    pub date: Option<String>,
    pub completed: Option<bool>,
    /// Must match the session user when given
    pub user_id: Option<i64>,
}

/// POST /api/completions
pub async fn toggle_completion(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;

    let task_id = req
        .task_id
        .ok_or_else(|| ApiError::validation("taskId is required"))?;
    let raw_date = required_field(req.date, "date")?;
    let date = parse_date(&raw_date)
        .ok_or_else(|| ApiError::validation("date must be a YYYY-MM-DD date"))?;
    let completed = req
        .completed
        .ok_or_else(|| ApiError::validation("completed is required"))?;

    if let Some(user_id) = req.user_id {
        if user_id != session.user.id {
            return Err(ApiError::forbidden("Cannot mark tasks on behalf of another user"));
        }
    }

    if !session.user.is_superadmin() {
        let schedule = load_schedule(&state.db).await?;
        if !schedule.is_on_duty(&session.user.group_name, date, &state.config.communal_group) {
            return Err(ApiError::forbidden(format!(
                "{} is not on duty on {}",
                session.user.group_name, date
            )));
        }
    }

    completions::toggle(&state.db, task_id, date, session.user.id, completed).await?;

    Ok(Json(json!({ "ok": true })))
}
