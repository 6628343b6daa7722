//! Login sessions and access control middleware
//!
//! Clients log in with username and password and receive an opaque bearer
//! token. Every protected request resolves the token back to the current
//! user row, so role and group changes apply immediately.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use piket_common::auth::{parse_bearer, verify_password};
use piket_common::models::User;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::required_field;
use crate::db::{load_schedule, sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Authenticated caller, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Resolve the bearer token to a user or reject with 401
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let user = sessions::session_user(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session expired or invalid"))?;

    debug!("{} {} as {}", request.method(), request.uri().path(), user.username);
    request.extensions_mut().insert(Session { token, user });

    Ok(next.run(request).await)
}

/// Reject callers without the superadmin role with 403
///
/// Must run inside [`require_session`].
pub async fn require_admin(
    Extension(session): Extension<Session>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !session.user.is_superadmin() {
        return Err(ApiError::forbidden("Superadmin role required"));
    }

    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub group: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: SessionUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let username = required_field(req.username, "username")?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("password is required"))?;

    let credentials = users::find_credentials(&state.db, &username).await?;
    let credentials = match credentials {
        Some(c) if verify_password(&password, &c.password_salt, &c.password_hash) => c,
        _ => {
            warn!("Failed login for '{}'", username);
            return Err(ApiError::unauthorized("Invalid username or password"));
        }
    };

    let purged = sessions::purge_expired(&state.db).await?;
    if purged > 0 {
        debug!("Purged {} expired sessions", purged);
    }

    let user = credentials.into_user();
    let issued = sessions::create_session(&state.db, user.id, state.config.session_ttl_hours).await?;
    info!("User '{}' logged in", user.username);

    Ok(Json(LoginResponse {
        user: SessionUser {
            id: user.id,
            username: user.username,
            role: user.role,
            group: user.group_name,
        },
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Value>> {
    sessions::delete_session(&state.db, &session.token).await?;
    info!("User '{}' logged out", session.user.username);
    Ok(Json(json!({ "message": "Logged out" })))
}

/// GET /api/auth/me
///
/// `dutyDays` lists the weekdays (0 = Sunday) the caller's group is rostered.
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<Value>> {
    let schedule = load_schedule(&state.db).await?;
    let duty_days = schedule.weekdays_for_group(&session.user.group_name);
    Ok(Json(json!({ "user": session.user, "dutyDays": duty_days })))
}
