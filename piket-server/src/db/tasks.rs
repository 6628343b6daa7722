//! Task catalog queries

use piket_common::models::Task;
use piket_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// All tasks in catalog order
pub async fn list_tasks(pool: &SqlitePool) -> Result<Vec<Task>> {
    let mut conn = pool.acquire().await?;
    list_tasks_with(&mut conn).await
}

/// All tasks in catalog order, through an existing connection
pub async fn list_tasks_with(conn: &mut SqliteConnection) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>("SELECT id, name, description FROM tasks ORDER BY id ASC")
        .fetch_all(conn)
        .await?;
    Ok(tasks)
}

pub async fn get_task(pool: &SqlitePool, id: i64) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT id, name, description FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(task)
}

pub async fn count_tasks(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Add a task; duplicate names are a conflict
pub async fn create_task(pool: &SqlitePool, name: &str, description: Option<&str>) -> Result<Task> {
    let result = sqlx::query("INSERT INTO tasks (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(pool)
        .await
        .map_err(|e| Error::conflict_on_unique(e, format!("Task '{}' already exists", name)))?;

    Ok(Task {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        description: description.map(str::to_string),
    })
}

/// Remove a task and, through the foreign key, its completions
pub async fn delete_task(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Task {} not found", id)));
    }
    Ok(())
}
