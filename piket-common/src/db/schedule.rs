//! Persisted duty roster
//!
//! Rows are `(weekday, position, group_name)`; `position` keeps the listed
//! order of groups within a day. The roster carries a version number in the
//! settings table, bumped on every admin edit.

use crate::schedule::DutySchedule;
use crate::{Error, Result};
use std::collections::BTreeMap;
use sqlx::{SqliteConnection, SqlitePool};

use super::settings::{get_parsed_setting, set_setting};

/// Settings key holding the roster version
pub const SCHEDULE_VERSION_KEY: &str = "schedule_version";

/// Load the roster from the database
pub async fn load_schedule(pool: &SqlitePool) -> Result<DutySchedule> {
    let mut conn = pool.acquire().await?;
    load_schedule_with(&mut conn).await
}

/// Load the roster through an existing connection (e.g. inside a read transaction)
pub async fn load_schedule_with(conn: &mut SqliteConnection) -> Result<DutySchedule> {
    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT weekday, group_name FROM duty_schedule ORDER BY weekday ASC, position ASC",
    )
    .fetch_all(conn)
    .await?;

    schedule_from_rows(rows)
}

fn schedule_from_rows(rows: Vec<(i64, String)>) -> Result<DutySchedule> {
    let mut days: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for (weekday, group) in rows {
        days.entry(weekday).or_default().push(group);
    }

    let mut schedule = DutySchedule::new();
    for (weekday, groups) in days {
        let weekday = u8::try_from(weekday)
            .map_err(|_| Error::Internal(format!("Stored roster has weekday {}", weekday)))?;
        schedule.set_day(weekday, groups)?;
    }
    Ok(schedule)
}

/// Current roster version (0 before seeding)
pub async fn schedule_version(pool: &SqlitePool) -> Result<i64> {
    Ok(get_parsed_setting::<i64>(pool, SCHEDULE_VERSION_KEY)
        .await?
        .unwrap_or(0))
}

/// Overwrite every roster row; caller owns the transaction
pub async fn replace_schedule(conn: &mut SqliteConnection, schedule: &DutySchedule) -> Result<()> {
    sqlx::query("DELETE FROM duty_schedule")
        .execute(&mut *conn)
        .await?;

    for (weekday, groups) in schedule.days() {
        for (position, group) in groups.iter().enumerate() {
            sqlx::query(
                "INSERT INTO duty_schedule (weekday, position, group_name) VALUES (?, ?, ?)",
            )
            .bind(i64::from(weekday))
            .bind(position as i64)
            .bind(group)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(())
}

/// Increment and return the roster version; caller owns the transaction
pub async fn bump_schedule_version(conn: &mut SqliteConnection) -> Result<i64> {
    let current: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(SCHEDULE_VERSION_KEY)
            .fetch_optional(&mut *conn)
            .await?;

    let next = current.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0) + 1;
    set_setting(conn, SCHEDULE_VERSION_KEY, &next.to_string()).await?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_grouped_in_stored_order() {
        let rows = vec![
            (1, "Grup 3".to_string()),
            (1, "Grup 1".to_string()),
            (0, "Piket Bersama".to_string()),
        ];
        let schedule = schedule_from_rows(rows).unwrap();
        assert_eq!(schedule.groups_on(1), &["Grup 3".to_string(), "Grup 1".to_string()]);
        assert_eq!(schedule.groups_on(0), &["Piket Bersama".to_string()]);
        assert!(schedule.groups_on(2).is_empty());
    }

    #[test]
    fn test_bad_stored_weekday_is_an_error() {
        assert!(matches!(
            schedule_from_rows(vec![(9, "Grup 1".to_string())]),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            schedule_from_rows(vec![(-1, "Grup 1".to_string())]),
            Err(Error::Internal(_))
        ));
    }
}
