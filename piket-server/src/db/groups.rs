//! Duty group queries
//!
//! Group names are also stored denormalized on `users.group_name` and
//! `duty_schedule.group_name`; rename and delete keep all three in step
//! inside one transaction.

use piket_common::db::bump_schedule_version;
use piket_common::models::Group;
use piket_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>> {
    let groups = sqlx::query_as::<_, Group>("SELECT name FROM groups ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(groups)
}

pub async fn group_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE name = ?)")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

async fn count_members(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE group_name = ?")
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

pub async fn create_group(pool: &SqlitePool, name: &str) -> Result<()> {
    sqlx::query("INSERT INTO groups (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| Error::conflict_on_unique(e, format!("Group '{}' already exists", name)))?;

    info!("Created group '{}'", name);
    Ok(())
}

/// Rename a group in groups, users and the roster atomically
pub async fn rename_group(pool: &SqlitePool, old_name: &str, new_name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE groups SET name = ? WHERE name = ?")
        .bind(new_name)
        .bind(old_name)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            Error::conflict_on_unique(e, format!("Group '{}' already exists", new_name))
        })?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Group '{}' not found", old_name)));
    }

    sqlx::query("UPDATE users SET group_name = ? WHERE group_name = ?")
        .bind(new_name)
        .bind(old_name)
        .execute(&mut *tx)
        .await?;

    if rewrite_schedule_rows(&mut tx, old_name, Some(new_name)).await? {
        bump_schedule_version(&mut tx).await?;
    }

    tx.commit().await?;
    info!("Renamed group '{}' to '{}'", old_name, new_name);
    Ok(())
}

/// Delete an empty group and drop it from the roster
///
/// # Errors
///
/// `Validation` while the group still has members, `NotFound` if it does
/// not exist.
pub async fn delete_group(pool: &SqlitePool, name: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    // Same transaction as the delete below
    let members = count_members(&mut tx, name).await?;
    if members > 0 {
        return Err(Error::Validation(format!(
            "Group '{}' still has {} member(s)",
            name, members
        )));
    }

    let result = sqlx::query("DELETE FROM groups WHERE name = ?")
        .bind(name)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Group '{}' not found", name)));
    }

    if rewrite_schedule_rows(&mut tx, name, None).await? {
        bump_schedule_version(&mut tx).await?;
    }

    tx.commit().await?;
    info!("Deleted group '{}'", name);
    Ok(())
}

/// Rename (or with `None`, remove) a group in the roster; true if any row changed
async fn rewrite_schedule_rows(
    conn: &mut SqliteConnection,
    old_name: &str,
    new_name: Option<&str>,
) -> Result<bool> {
    let result = match new_name {
        Some(new_name) => {
            sqlx::query("UPDATE duty_schedule SET group_name = ? WHERE group_name = ?")
                .bind(new_name)
                .bind(old_name)
                .execute(&mut *conn)
                .await?
        }
        None => {
            sqlx::query("DELETE FROM duty_schedule WHERE group_name = ?")
                .bind(old_name)
                .execute(&mut *conn)
                .await?
        }
    };
    Ok(result.rows_affected() > 0)
}
