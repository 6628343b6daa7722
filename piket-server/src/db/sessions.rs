//! Server-side login sessions
//!
//! Timestamps are Unix seconds. A session is valid while `expires_at` is in
//! the future; the user's role and group are read fresh on every lookup.

use chrono::{DateTime, Duration, Utc};
use piket_common::auth::generate_session_token;
use piket_common::models::User;
use piket_common::{Error, Result};
use sqlx::SqlitePool;

/// Newly issued session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue a session for `user_id` valid for `ttl_hours`
pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl_hours: i64) -> Result<IssuedSession> {
    let now = Utc::now();
    let expires_at = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| Error::Config(format!("session lifetime of {} hours is out of range", ttl_hours)))?;
    let token = generate_session_token();

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now.timestamp())
        .bind(expires_at.timestamp())
        .execute(pool)
        .await?;

    Ok(IssuedSession { token, expires_at })
}

/// User behind a live session token
pub async fn session_user(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.group_name, u.role
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(Utc::now().timestamp())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// End every session of a user (after a password reset)
pub async fn delete_user_sessions(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Drop expired sessions, returning how many were removed
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use piket_common::config::ServerConfig;
    use piket_common::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_an_error() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("piket.db"), &ServerConfig::default())
            .await
            .unwrap();

        let result = create_session(&pool, 1, 9_000_000_000_000_000).await;
        assert!(matches!(result, Err(Error::Config(_))));

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 0);

        let issued = create_session(&pool, 1, 12).await.unwrap();
        let user = session_user(&pool, &issued.token).await.unwrap();
        assert_eq!(user.map(|u| u.username), Some("admin".to_string()));
    }
}
