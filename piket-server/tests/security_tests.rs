//! Access control tests for piket-server
//!
//! Tests cover:
//! - Missing, unknown and expired bearer tokens
//! - Logout revoking the token
//! - Regular users kept out of superadmin endpoints
//! - Malformed request bodies, path parameters and query strings

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use piket_common::config::ServerConfig;
use piket_server::db::init_database;
use piket_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup() -> (TempDir, Router, SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let config = ServerConfig::default();
    let pool = init_database(&dir.path().join("piket.db"), &config)
        .await
        .expect("Should initialize test database");
    let app = build_router(AppState::new(pool.clone(), config));
    (dir, app, pool)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn status_and_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let body = json!({ "username": username, "password": password }).to_string();
    let (status, json) = status_and_json(app, request("POST", "/api/auth/login", None, Some(body))).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", json);
    json["token"].as_str().unwrap().to_string()
}

/// Regular member of Grup 2
async fn member_token(app: &Router) -> String {
    let admin = login(app, "admin", "admin").await;
    let body = json!({
        "username": "siti",
        "password": "rahasia",
        "group": "Grup 2",
        "role": "user",
    })
    .to_string();
    let (status, _) = status_and_json(app, request("POST", "/api/users", Some(&admin), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, "siti", "rahasia").await
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let (_dir, app, _pool) = setup().await;

    for uri in ["/api/tasks", "/api/recap?startDate=2024-03-01&endDate=2024-03-02", "/api/users"] {
        let (status, body) = status_and_json(&app, request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["code"], "AUTH_ERROR");
    }
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let (_dir, app, _pool) = setup().await;

    let (status, _) = status_and_json(&app, request("GET", "/api/tasks", Some("not-a-session"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let basic = Request::builder()
        .uri("/api/tasks")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let (status, _) = status_and_json(&app, basic).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let (_dir, app, pool) = setup().await;
    let token = login(&app, "admin", "admin").await;

    sqlx::query("UPDATE sessions SET expires_at = expires_at - 1000000 WHERE token = ?")
        .bind(&token)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = status_and_json(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (_dir, app, _pool) = setup().await;
    let token = login(&app, "admin", "admin").await;

    let (status, _) = status_and_json(&app, request("POST", "/api/auth/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = status_and_json(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_kept_out_of_admin_routes() {
    let (_dir, app, _pool) = setup().await;
    let token = member_token(&app).await;

    let attempts = [
        ("GET", "/api/admin/data", None),
        ("GET", "/api/users", None),
        ("GET", "/api/groups", None),
        ("POST", "/api/groups", Some(json!({ "name": "Grup 9" }).to_string())),
        ("POST", "/api/admin/tasks", Some(json!({ "name": "Sapu" }).to_string())),
        ("DELETE", "/api/admin/tasks/1", None),
        ("PUT", "/api/admin/schedule", Some(json!({ "schedule": [] }).to_string())),
        ("POST", "/api/users/1/reset-password", None),
    ];

    for (method, uri, body) in attempts {
        let (status, json) = status_and_json(&app, request(method, uri, Some(&token), body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(json["code"], "PERMISSION_DENIED");
    }

    // Shared endpoints stay open to members
    for uri in ["/api/tasks", "/api/schedule", "/api/dashboard-stats", "/api/auth/me"] {
        let (status, _) = status_and_json(&app, request("GET", uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (_dir, app, _pool) = setup().await;
    let token = login(&app, "admin", "admin").await;

    let (status, body) = status_and_json(
        &app,
        request("POST", "/api/completions", Some(&token), Some("{not json".to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = status_and_json(
        &app,
        request("POST", "/api/auth/login", None, Some("\"just a string\"".to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_details_not_leaked() {
    let (_dir, app, pool) = setup().await;
    let token = login(&app, "admin", "admin").await;

    sqlx::query("DROP TABLE task_completions")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = status_and_json(
        &app,
        request("GET", "/api/completions?date=2024-03-04", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Storage error");
    assert_eq!(body["code"], "STORAGE_ERROR");
}

#[tokio::test]
async fn test_bad_path_parameter_is_json_error() {
    let (_dir, app, _pool) = setup().await;
    let token = login(&app, "admin", "admin").await;

    for (method, uri) in [
        ("DELETE", "/api/users/abc"),
        ("POST", "/api/users/abc/reset-password"),
        ("DELETE", "/api/admin/tasks/first"),
    ] {
        let (status, body) = status_and_json(&app, request(method, uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["code"], "VALIDATION_ERROR", "{} {}", method, uri);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_bad_query_string_is_json_error() {
    let (_dir, app, _pool) = setup().await;
    let token = login(&app, "admin", "admin").await;

    let (status, body) = status_and_json(
        &app,
        request(
            "GET",
            "/api/recap?startDate=2024-03-01&startDate=2024-03-02&endDate=2024-03-05",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].is_string());

    let (status, body) = status_and_json(
        &app,
        request("GET", "/api/completions?date=2024-03-04&date=2024-03-05", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
