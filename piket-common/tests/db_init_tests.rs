//! Integration tests for database initialization and seeding
//!
//! Tests cover:
//! - Automatic database creation with the full schema
//! - Seeding of groups, roster and bootstrap superadmin
//! - Idempotent re-open of an existing database
//! - Roster persistence round trip and versioning

use piket_common::auth::verify_password;
use piket_common::config::ServerConfig;
use piket_common::db::{
    bump_schedule_version, init_database, load_schedule, replace_schedule, schedule_version,
};
use piket_common::DutySchedule;
use tempfile::TempDir;

async fn fresh_db() -> (TempDir, sqlx::SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("piket.db");
    let pool = init_database(&db_path, &ServerConfig::default())
        .await
        .expect("init database");
    (dir, pool)
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("piket.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path, &ServerConfig::default()).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_all_tables_created() {
    let (_dir, pool) = fresh_db().await;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "duty_schedule",
        "groups",
        "sessions",
        "settings",
        "task_completions",
        "tasks",
        "users",
    ] {
        assert!(
            tables.iter().any(|t| t == expected),
            "Should have table: {}",
            expected
        );
    }
}

#[tokio::test]
async fn test_seeded_groups_roster_and_admin() {
    let (_dir, pool) = fresh_db().await;

    let groups: Vec<String> = sqlx::query_scalar("SELECT name FROM groups ORDER BY name")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(groups, vec!["Grup 1", "Grup 2", "Grup 3"]);

    let schedule = load_schedule(&pool).await.unwrap();
    assert_eq!(schedule, DutySchedule::default_roster("Piket Bersama"));
    assert_eq!(schedule_version(&pool).await.unwrap(), 1);

    let (hash, salt, role): (String, String, String) = sqlx::query_as(
        "SELECT password_hash, password_salt, role FROM users WHERE username = 'admin'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(role, "superadmin");
    assert!(verify_password("admin", &salt, &hash));
}

#[tokio::test]
async fn test_reopen_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("piket.db");
    let config = ServerConfig::default();

    let pool = init_database(&db_path, &config).await.unwrap();

    // Admin clears Sunday; a restart must not re-seed it
    let mut schedule = load_schedule(&pool).await.unwrap();
    schedule.set_day(0, vec![]).unwrap();
    let mut tx = pool.begin().await.unwrap();
    replace_schedule(&mut tx, &schedule).await.unwrap();
    bump_schedule_version(&mut tx).await.unwrap();
    tx.commit().await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path, &config).await.unwrap();
    let reloaded = load_schedule(&pool).await.unwrap();
    assert!(reloaded.groups_on(0).is_empty());
    assert_eq!(schedule_version(&pool).await.unwrap(), 2);

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'superadmin'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 1);
}

#[tokio::test]
async fn test_roster_preserves_group_order_within_day() {
    let (_dir, pool) = fresh_db().await;

    let mut schedule = DutySchedule::new();
    schedule
        .set_day(2, vec!["Grup 3".into(), "Grup 1".into()])
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    replace_schedule(&mut tx, &schedule).await.unwrap();
    tx.commit().await.unwrap();

    let loaded = load_schedule(&pool).await.unwrap();
    assert_eq!(loaded.groups_on(2), &["Grup 3".to_string(), "Grup 1".to_string()]);
    assert_eq!(loaded.days().count(), 1);
}

#[tokio::test]
async fn test_completion_uniqueness_enforced() {
    let (_dir, pool) = fresh_db().await;

    sqlx::query("INSERT INTO tasks (name) VALUES ('Sweep')")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO task_completions (task_id, date, user_id) VALUES (1, '2024-03-04', 1)")
        .execute(&pool)
        .await
        .unwrap();

    let duplicate = sqlx::query(
        "INSERT INTO task_completions (task_id, date, user_id) VALUES (1, '2024-03-04', 1)",
    )
    .execute(&pool)
    .await;
    assert!(duplicate.is_err(), "(task_id, date) must be unique");
}

#[tokio::test]
async fn test_bootstrap_skipped_when_admin_name_taken() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("piket.db");
    let config = ServerConfig::default();

    let pool = init_database(&db_path, &config).await.unwrap();
    sqlx::query("UPDATE users SET role = 'user' WHERE username = 'admin'")
        .execute(&pool)
        .await
        .unwrap();
    let before: (i64, String) =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE username = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
    pool.close().await;

    // No superadmin left, but the bootstrap name belongs to a regular user
    let pool = init_database(&db_path, &config).await.unwrap();

    let rows: Vec<(i64, String, String)> =
        sqlx::query_as("SELECT id, password_hash, role FROM users WHERE username = 'admin'")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].0, rows[0].1.clone()), before);
    assert_eq!(rows[0].2, "user");

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'superadmin'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 0);
}
