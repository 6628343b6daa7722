//! User management (superadmin only)

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Extension, Json,
};
use piket_common::auth::MIN_PASSWORD_LEN;
use piket_common::models::{is_valid_role, ROLE_SUPERADMIN};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{required_field, Session};
use crate::db::{groups, sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let users = users::list_users(&state.db).await?;
    Ok(Json(json!({ "users": users })))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub group: Option<String>,
    pub role: Option<String>,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = payload?;
    let username = required_field(req.username, "username")?;
    let group = required_field(req.group, "group")?;
    let role = required_field(req.role, "role")?;
    let password = req.password.unwrap_or_default();

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    check_role(&role)?;
    check_group(&state, &group).await?;

    let fields = users::UserFields {
        username: &username,
        group_name: &group,
        role: &role,
    };
    let user_id = users::create_user(&state.db, &fields, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "userId": user_id })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub group_name: Option<String>,
    pub role: Option<String>,
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let username = required_field(req.username, "username")?;
    let group = required_field(req.group_name, "groupName")?;
    let role = required_field(req.role, "role")?;

    check_role(&role)?;
    check_group(&state, &group).await?;

    if id == session.user.id && role != ROLE_SUPERADMIN {
        return Err(ApiError::forbidden("Cannot remove your own superadmin role"));
    }

    let fields = users::UserFields {
        username: &username,
        group_name: &group,
        role: &role,
    };
    users::update_user(&state.db, id, &fields).await?;

    Ok(Json(json!({ "message": "User updated" })))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    if id == session.user.id {
        return Err(ApiError::forbidden("Cannot delete your own account"));
    }

    users::delete_user(&state.db, id).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

/// POST /api/users/:id/reset-password
///
/// Sets the configured default password and logs the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    users::set_password(&state.db, id, &state.config.default_password).await?;
    let revoked = sessions::delete_user_sessions(&state.db, id).await?;
    info!("Password reset for user {} ({} sessions revoked)", id, revoked);

    Ok(Json(json!({ "message": "Password reset to default" })))
}

fn check_role(role: &str) -> ApiResult<()> {
    if is_valid_role(role) {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Unknown role '{}'", role)))
    }
}

/// Users belong to a defined group or to the communal label
async fn check_group(state: &AppState, group: &str) -> ApiResult<()> {
    if group == state.config.communal_group || groups::group_exists(&state.db, group).await? {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Unknown group '{}'", group)))
    }
}
