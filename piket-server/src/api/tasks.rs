//! Task catalog endpoints

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use piket_common::models::Task;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::required_field;
use crate::db::tasks;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let tasks = tasks::list_tasks(&state.db).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// POST /api/admin/tasks
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = payload?;
    let name = required_field(req.name, "name")?;
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let task: Task = tasks::create_task(&state.db, &name, description).await?;
    info!("Task '{}' created (id {})", task.name, task.id);

    Ok((StatusCode::CREATED, Json(json!({ "task": task }))))
}

/// DELETE /api/admin/tasks/:id
///
/// Completions of the task are removed with it.
pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    tasks::delete_task(&state.db, id).await?;
    info!("Task {} deleted", id);
    Ok(Json(json!({ "message": "Task deleted" })))
}
