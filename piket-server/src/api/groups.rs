//! Duty group management (superadmin only)
//!
//! Renames and deletes cascade into user rows and the weekly roster.

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::required_field;
use crate::db::groups;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/groups
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let groups = groups::list_groups(&state.db).await?;
    Ok(Json(json!({ "groups": groups })))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
}

/// POST /api/groups
pub async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = payload?;
    let name = required_field(req.name, "name")?;
    reject_communal(&state, &name)?;

    groups::create_group(&state.db, &name).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Group created" }))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameGroupRequest {
    pub new_name: Option<String>,
}

/// PUT /api/groups/:name
pub async fn rename_group(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<RenameGroupRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(name) = path?;
    let Json(req) = payload?;
    let new_name = required_field(req.new_name, "newName")?;
    reject_communal(&state, &new_name)?;

    groups::rename_group(&state.db, &name, &new_name).await?;
    Ok(Json(json!({ "message": "Group renamed" })))
}

/// DELETE /api/groups/:name
pub async fn delete_group(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(name) = path?;
    groups::delete_group(&state.db, &name).await?;
    Ok(Json(json!({ "message": "Group deleted" })))
}

// The communal label is reserved for whole-household days
fn reject_communal(state: &AppState, name: &str) -> ApiResult<()> {
    if name == state.config.communal_group {
        return Err(ApiError::validation(format!("'{}' is a reserved name", name)));
    }
    Ok(())
}
