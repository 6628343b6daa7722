//! Key-value settings table accessors

use crate::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;

/// Read a raw setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

/// Read and parse a setting; unparsable values are an internal error
pub async fn get_parsed_setting<T>(pool: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_setting(pool, key).await? {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Internal(format!("Setting '{}' is invalid: {}", key, e))),
        None => Ok(None),
    }
}

/// Insert or overwrite a setting inside an open transaction or connection
pub async fn set_setting(conn: &mut SqliteConnection, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(conn)
    .await?;
    Ok(())
}
