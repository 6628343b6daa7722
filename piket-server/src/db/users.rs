//! User account queries
//!
//! Credentials never leave this module except through `find_credentials`.

use piket_common::auth::new_credentials;
use piket_common::models::User;
use piket_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

const SELECT_USERS: &str = "SELECT id, username, group_name, role FROM users";

/// Stored credentials for one user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credentials {
    pub id: i64,
    pub username: String,
    pub group_name: String,
    pub role: String,
    pub password_hash: String,
    pub password_salt: String,
}

impl Credentials {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            group_name: self.group_name,
            role: self.role,
        }
    }
}

/// Fields an admin sets on create/update
#[derive(Debug, Clone)]
pub struct UserFields<'a> {
    pub username: &'a str,
    pub group_name: &'a str,
    pub role: &'a str,
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let sql = format!("{} ORDER BY username ASC", SELECT_USERS);
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn find_credentials(pool: &SqlitePool, username: &str) -> Result<Option<Credentials>> {
    let creds = sqlx::query_as::<_, Credentials>(
        r#"
        SELECT id, username, group_name, role, password_hash, password_salt
        FROM users WHERE username = ? LIMIT 1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(creds)
}

/// Create a user and return its id
pub async fn create_user(pool: &SqlitePool, fields: &UserFields<'_>, password: &str) -> Result<i64> {
    let (hash, salt) = new_credentials(password);
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, password_salt, group_name, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(fields.username)
    .bind(hash)
    .bind(salt)
    .bind(fields.group_name)
    .bind(fields.role)
    .execute(pool)
    .await
    .map_err(|e| Error::conflict_on_unique(e, "Username already taken"))?;

    let id = result.last_insert_rowid();
    info!("Created user '{}' (id {})", fields.username, id);
    Ok(id)
}

pub async fn update_user(pool: &SqlitePool, id: i64, fields: &UserFields<'_>) -> Result<()> {
    let result = sqlx::query("UPDATE users SET username = ?, group_name = ?, role = ? WHERE id = ?")
        .bind(fields.username)
        .bind(fields.group_name)
        .bind(fields.role)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::conflict_on_unique(e, "Username already taken"))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} not found", id)));
    }
    info!("Updated user {}", id);
    Ok(())
}

/// Delete a user; sessions and completions go with it
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} not found", id)));
    }
    info!("Deleted user {}", id);
    Ok(())
}

/// Replace a user's password with a freshly salted hash
pub async fn set_password(pool: &SqlitePool, id: i64, password: &str) -> Result<()> {
    let (hash, salt) = new_credentials(password);
    let result = sqlx::query("UPDATE users SET password_hash = ?, password_salt = ? WHERE id = ?")
        .bind(hash)
        .bind(salt)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {} not found", id)));
    }
    Ok(())
}
