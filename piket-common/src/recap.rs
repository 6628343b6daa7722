//! Recap reconciliation
//!
//! Reconciles what the duty roster required against what was actually checked
//! off, for an inclusive date range. Pure computation over already-fetched
//! inputs; callers own the reads.
//!
//! Rules:
//! - every day in range whose weekday has groups on duty owes every task once
//! - a day with no groups owes nothing
//! - a completion with a matching `(date, task)` marks the entry Completed
//! - completions with no matching required entry are dropped
//! - output is newest day first, catalog order within a day

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Completion, Task};
use crate::schedule::DutySchedule;
use crate::time::{days_inclusive, format_date};
use crate::{Error, Result};

/// Outcome of one required entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecapStatus {
    Completed,
    Missed,
}

/// One `(date, task)` that was due in the range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapEntry {
    pub date: NaiveDate,
    pub task_name: String,
    pub status: RecapStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    pub group: String,
}

/// Count of entries per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecapTotals {
    pub completed: usize,
    pub missed: usize,
}

impl RecapTotals {
    pub fn from_entries(entries: &[RecapEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, e| {
            match e.status {
                RecapStatus::Completed => acc.completed += 1,
                RecapStatus::Missed => acc.missed += 1,
            }
            acc
        })
    }
}

/// Build the recap for `[start, end]`
///
/// `communal` is the label of the shared duty group. On a day whose roster
/// contains it, every entry (missed or completed) is attributed to that
/// label instead of a specific group.
///
/// # Errors
///
/// `Error::InvalidRange` when `start > end`.
pub fn reconcile(
    start: NaiveDate,
    end: NaiveDate,
    tasks: &[Task],
    completions: &[Completion],
    schedule: &DutySchedule,
    communal: &str,
) -> Result<Vec<RecapEntry>> {
    if start > end {
        return Err(Error::InvalidRange {
            start: format_date(start),
            end: format_date(end),
        });
    }

    let days: Vec<NaiveDate> = days_inclusive(start, end).collect();

    let mut entries: Vec<RecapEntry> = Vec::new();
    let mut index: HashMap<(NaiveDate, i64), usize> = HashMap::new();
    let mut communal_days: HashMap<NaiveDate, bool> = HashMap::new();

    // Newest first; within a day the catalog order is kept
    for &day in days.iter().rev() {
        let groups = schedule.groups_for_date(day);
        if groups.is_empty() {
            continue;
        }

        let is_communal = groups.iter().any(|g| g == communal);
        communal_days.insert(day, is_communal);
        let duty_group = if is_communal {
            communal.to_string()
        } else {
            groups.join(", ")
        };

        for task in tasks {
            index.insert((day, task.id), entries.len());
            entries.push(RecapEntry {
                date: day,
                task_name: task.name.clone(),
                status: RecapStatus::Missed,
                completed_by: None,
                group: duty_group.clone(),
            });
        }
    }

    for completion in completions {
        let Some(&i) = index.get(&(completion.date, completion.task_id)) else {
            continue;
        };
        let entry = &mut entries[i];
        if entry.status == RecapStatus::Completed {
            continue;
        }

        entry.status = RecapStatus::Completed;
        entry.completed_by = Some(completion.username.clone());
        if !communal_days.get(&completion.date).copied().unwrap_or(false) {
            entry.group = completion.group_name.clone();
        }
    }

    Ok(entries)
}
