//! Database initialization
//!
//! Creates the schema on first run and seeds it:
//! - default duty groups and the standard weekly roster
//! - a bootstrap superadmin when no superadmin exists
//!
//! Every step is idempotent; opening an existing database changes nothing
//! that is already there.

use crate::auth::new_credentials;
use crate::config::ServerConfig;
use crate::models::ROLE_SUPERADMIN;
use crate::schedule::DutySchedule;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::schedule::{replace_schedule, SCHEDULE_VERSION_KEY};
use super::settings::get_setting;

/// Groups created on a fresh database
pub const DEFAULT_GROUPS: [&str; 3] = ["Grup 1", "Grup 2", "Grup 3"];

/// Open (creating if needed) the database and bring the schema up to date
pub async fn init_database(db_path: &Path, config: &ServerConfig) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Foreign keys are a per-connection pragma, so they go on the connect
    // options rather than a one-off query
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_settings_table(&pool).await?;
    create_groups_table(&pool).await?;
    create_users_table(&pool).await?;
    create_tasks_table(&pool).await?;
    create_task_completions_table(&pool).await?;
    create_duty_schedule_table(&pool).await?;
    create_sessions_table(&pool).await?;

    seed_schedule(&pool, &config.communal_group).await?;
    seed_superadmin(&pool, config).await?;

    Ok(pool)
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_groups_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS groups (
            name TEXT PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            group_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'superadmin')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_group_name ON users(group_name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_tasks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// At most one completion per (task_id, date)
async fn create_task_completions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_completions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            completed_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (task_id, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_task_completions_date ON task_completions(date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_duty_schedule_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS duty_schedule (
            weekday INTEGER NOT NULL CHECK (weekday BETWEEN 0 AND 6),
            position INTEGER NOT NULL,
            group_name TEXT NOT NULL,
            PRIMARY KEY (weekday, group_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed groups and the standard roster, once per database
///
/// The schedule version setting doubles as the "already seeded" marker so an
/// admin who empties the roster does not get it back on restart.
async fn seed_schedule(pool: &SqlitePool, communal: &str) -> Result<()> {
    if get_setting(pool, SCHEDULE_VERSION_KEY).await?.is_some() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for group in DEFAULT_GROUPS {
        sqlx::query("INSERT OR IGNORE INTO groups (name) VALUES (?)")
            .bind(group)
            .execute(&mut *tx)
            .await?;
    }

    let roster = DutySchedule::default_roster(communal);
    replace_schedule(&mut *tx, &roster).await?;

    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, '1')")
        .bind(SCHEDULE_VERSION_KEY)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Seeded default groups and duty roster");
    Ok(())
}

/// Ensure at least one superadmin can log in
async fn seed_superadmin(pool: &SqlitePool, config: &ServerConfig) -> Result<()> {
    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(ROLE_SUPERADMIN)
        .fetch_one(pool)
        .await?;

    if admins > 0 {
        return Ok(());
    }

    let group: Option<String> = sqlx::query_scalar("SELECT name FROM groups ORDER BY name ASC LIMIT 1")
        .fetch_optional(pool)
        .await?;
    let group = group.unwrap_or_else(|| config.communal_group.clone());

    let (hash, salt) = new_credentials(&config.admin_password);
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (username, password_hash, password_salt, group_name, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&config.admin_username)
    .bind(hash)
    .bind(salt)
    .bind(group)
    .bind(ROLE_SUPERADMIN)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        warn!(
            "No superadmin exists and username '{}' is taken by a regular user; bootstrap account not created",
            config.admin_username
        );
    } else {
        info!("Created bootstrap superadmin '{}'", config.admin_username);
    }
    Ok(())
}
