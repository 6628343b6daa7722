//! piket-server library - household duty roster HTTP API
//!
//! Routes are grouped by who may call them:
//! - public: health check and login
//! - session: any logged-in user (bearer token)
//! - admin: superadmin role only

use axum::Router;
use piket_common::config::ServerConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Settings loaded at startup
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: ServerConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    // Superadmin only; runs after the session layer below has identified the caller
    let admin = Router::new()
        .route("/admin/data", get(api::get_admin_data))
        .route("/admin/schedule", put(api::update_schedule))
        .route("/admin/tasks", post(api::create_task))
        .route("/admin/tasks/:id", delete(api::delete_task))
        .route("/users", get(api::list_users).post(api::create_user))
        .route("/users/:id", put(api::update_user).delete(api::delete_user))
        .route("/users/:id/reset-password", post(api::reset_password))
        .route("/groups", get(api::list_groups).post(api::create_group))
        .route("/groups/:name", put(api::rename_group).delete(api::delete_group))
        .layer(middleware::from_fn(api::require_admin));

    // Any logged-in user
    let protected = Router::new()
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me))
        .route("/tasks", get(api::list_tasks))
        .route("/completions", get(api::list_completions).post(api::toggle_completion))
        .route("/recap", get(api::get_recap))
        .route("/dashboard-stats", get(api::dashboard_stats))
        .route("/schedule", get(api::get_schedule))
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    let routes = Router::new()
        .route("/auth/login", post(api::login))
        .merge(protected);

    let prefix = state.config.api_prefix.clone();
    let router = if prefix.is_empty() {
        Router::new().merge(routes)
    } else {
        Router::new().nest(&prefix, routes)
    };

    router
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
