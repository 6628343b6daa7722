//! Task completion queries
//!
//! At most one row per `(task_id, date)`. Checking a task off upserts the row
//! (last writer wins); unchecking deletes it, but only for the user who owns
//! it.

use chrono::NaiveDate;
use piket_common::models::Completion;
use piket_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::tasks::get_task;

const SELECT_COMPLETIONS: &str = r#"
    SELECT c.id, c.task_id, c.date, c.user_id, u.username, u.group_name
    FROM task_completions c
    JOIN users u ON u.id = c.user_id
"#;

/// Completions recorded for one day
pub async fn completions_on(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<Completion>> {
    let sql = format!("{} WHERE c.date = ? ORDER BY c.task_id ASC", SELECT_COMPLETIONS);
    let rows = sqlx::query_as::<_, Completion>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Completions with `start <= date <= end`, through an existing connection
pub async fn completions_between_with(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Completion>> {
    let sql = format!(
        "{} WHERE c.date BETWEEN ? AND ? ORDER BY c.date DESC, c.task_id ASC",
        SELECT_COMPLETIONS
    );
    let rows = sqlx::query_as::<_, Completion>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Number of tasks checked off on a day
pub async fn count_on(pool: &SqlitePool, date: NaiveDate) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_completions WHERE date = ?")
        .bind(date)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Record or retract a completion for `user_id`
///
/// # Errors
///
/// - `NotFound` when the task does not exist
/// - `PermissionDenied` when retracting a completion owned by someone else;
///   the row is left untouched
pub async fn toggle(
    pool: &SqlitePool,
    task_id: i64,
    date: NaiveDate,
    user_id: i64,
    completed: bool,
) -> Result<()> {
    if get_task(pool, task_id).await?.is_none() {
        return Err(Error::NotFound(format!("Task {} not found", task_id)));
    }

    if completed {
        sqlx::query(
            r#"
            INSERT INTO task_completions (task_id, date, user_id)
            VALUES (?, ?, ?)
            ON CONFLICT(task_id, date) DO UPDATE SET
                user_id = excluded.user_id,
                completed_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(task_id)
        .bind(date)
        .bind(user_id)
        .execute(pool)
        .await?;

        info!("Task {} completed on {} by user {}", task_id, date, user_id);
        return Ok(());
    }

    let mut conn = pool.acquire().await?;
    retract(&mut conn, task_id, date, user_id).await
}

async fn retract(
    conn: &mut SqliteConnection,
    task_id: i64,
    date: NaiveDate,
    user_id: i64,
) -> Result<()> {
    // Conditional delete keeps the ownership check and the removal atomic
    let result = sqlx::query(
        "DELETE FROM task_completions WHERE task_id = ? AND date = ? AND user_id = ?",
    )
    .bind(task_id)
    .bind(date)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() > 0 {
        info!("Task {} on {} retracted by user {}", task_id, date, user_id);
        return Ok(());
    }

    let owner: Option<i64> =
        sqlx::query_scalar("SELECT user_id FROM task_completions WHERE task_id = ? AND date = ?")
            .bind(task_id)
            .bind(date)
            .fetch_optional(&mut *conn)
            .await?;

    match owner {
        Some(_) => Err(Error::PermissionDenied(
            "Only the user who completed this task can undo it".to_string(),
        )),
        // Nothing to retract
        None => Ok(()),
    }
}
