//! Weekday → duty group roster
//!
//! The roster is a static day-of-week lookup: weekday 0 (Sunday) through 6
//! (Saturday) each map to an ordered list of group names. A weekday with no
//! groups has no duty at all.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time::weekday_index;
use crate::{Error, Result};

/// English day names indexed by weekday (0 = Sunday)
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// One weekday of the roster as exchanged over the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub weekday: u8,
    #[serde(default)]
    pub day_name: String,
    pub groups: Vec<String>,
}

/// Weekday → groups on duty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DutySchedule {
    days: BTreeMap<u8, Vec<String>>,
}

impl DutySchedule {
    /// Empty roster (nobody is ever on duty)
    pub fn new() -> Self {
        Self::default()
    }

    /// The household's standard rotation
    ///
    /// Three groups alternate Monday through Saturday; Sunday is shared by
    /// everyone under the communal label.
    pub fn default_roster(communal: &str) -> Self {
        let mut schedule = Self::new();
        let pairs: [(u8, &str); 7] = [
            (0, communal),
            (1, "Grup 1"),
            (2, "Grup 2"),
            (3, "Grup 3"),
            (4, "Grup 1"),
            (5, "Grup 2"),
            (6, "Grup 3"),
        ];
        for (weekday, group) in pairs {
            schedule.days.insert(weekday, vec![group.to_string()]);
        }
        schedule
    }

    /// Build from API rows, rejecting bad weekdays and duplicate days
    pub fn from_days(days: &[ScheduleDay]) -> Result<Self> {
        let mut schedule = Self::new();
        for day in days {
            if schedule.days.contains_key(&day.weekday) {
                return Err(Error::Validation(format!(
                    "weekday {} listed more than once",
                    day.weekday
                )));
            }
            schedule.set_day(day.weekday, day.groups.clone())?;
        }
        Ok(schedule)
    }

    /// Replace the groups on duty for one weekday
    ///
    /// Names are trimmed, blanks dropped, duplicates removed keeping the first
    /// occurrence. An empty list clears the day.
    pub fn set_day(&mut self, weekday: u8, groups: Vec<String>) -> Result<()> {
        if weekday > 6 {
            return Err(Error::Validation(format!(
                "weekday must be 0 (Sunday) to 6 (Saturday), got {}",
                weekday
            )));
        }

        let mut cleaned: Vec<String> = Vec::with_capacity(groups.len());
        for group in groups {
            let name = group.trim();
            if !name.is_empty() && !cleaned.iter().any(|g| g == name) {
                cleaned.push(name.to_string());
            }
        }

        if cleaned.is_empty() {
            self.days.remove(&weekday);
        } else {
            self.days.insert(weekday, cleaned);
        }
        Ok(())
    }

    /// Groups on duty for a weekday (empty slice when none)
    pub fn groups_on(&self, weekday: u8) -> &[String] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Groups on duty for a calendar date
    pub fn groups_for_date(&self, date: NaiveDate) -> &[String] {
        self.groups_on(weekday_index(date))
    }

    /// Configured weekdays in ascending order
    pub fn days(&self) -> impl Iterator<Item = (u8, &[String])> {
        self.days.iter().map(|(w, g)| (*w, g.as_slice()))
    }

    /// Every distinct group name referenced by the roster
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for groups in self.days.values() {
            for g in groups {
                if !names.contains(&g.as_str()) {
                    names.push(g);
                }
            }
        }
        names
    }

    /// Weekdays whose roster names `group` directly
    ///
    /// Communal days only count when `group` is the communal label itself.
    pub fn weekdays_for_group(&self, group: &str) -> Vec<u8> {
        self.days
            .iter()
            .filter(|(_, groups)| groups.iter().any(|g| g == group))
            .map(|(w, _)| *w)
            .collect()
    }

    /// Whether a member of `group` owes duty on `date`
    ///
    /// Everyone is on duty on a communal day.
    pub fn is_on_duty(&self, group: &str, date: NaiveDate, communal: &str) -> bool {
        self.groups_for_date(date)
            .iter()
            .any(|g| g == group || g == communal)
    }

    /// Rows for all seven weekdays, including empty ones
    pub fn to_days(&self) -> Vec<ScheduleDay> {
        (0u8..7)
            .map(|weekday| ScheduleDay {
                weekday,
                day_name: DAY_NAMES[weekday as usize].to_string(),
                groups: self.groups_on(weekday).to_vec(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_date;

    const COMMUNAL: &str = "Piket Bersama";

    #[test]
    fn test_default_roster_covers_every_day() {
        let s = DutySchedule::default_roster(COMMUNAL);
        assert_eq!(s.groups_on(0), &[COMMUNAL.to_string()]);
        assert_eq!(s.groups_on(1), &["Grup 1".to_string()]);
        assert_eq!(s.groups_on(6), &["Grup 3".to_string()]);
        assert_eq!(s.weekdays_for_group("Grup 2"), vec![2, 5]);
    }

    #[test]
    fn test_groups_for_date() {
        let s = DutySchedule::default_roster(COMMUNAL);
        // 2024-03-07 is a Thursday
        let thursday = parse_date("2024-03-07").unwrap();
        assert_eq!(s.groups_for_date(thursday), &["Grup 1".to_string()]);
    }

    #[test]
    fn test_set_day_cleans_names() {
        let mut s = DutySchedule::new();
        s.set_day(
            2,
            vec![" A ".into(), "".into(), "B".into(), "A".into()],
        )
        .unwrap();
        assert_eq!(s.groups_on(2), &["A".to_string(), "B".to_string()]);

        s.set_day(2, vec!["  ".into()]).unwrap();
        assert!(s.groups_on(2).is_empty());
        assert_eq!(s.days().count(), 0);
    }

    #[test]
    fn test_set_day_rejects_bad_weekday() {
        let mut s = DutySchedule::new();
        assert!(matches!(
            s.set_day(7, vec!["A".into()]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_from_days_rejects_duplicates() {
        let day = ScheduleDay {
            weekday: 1,
            day_name: String::new(),
            groups: vec!["A".into()],
        };
        let result = DutySchedule::from_days(&[day.clone(), day]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_is_on_duty_with_communal_day() {
        let s = DutySchedule::default_roster(COMMUNAL);
        let sunday = parse_date("2024-03-03").unwrap();
        let monday = parse_date("2024-03-04").unwrap();
        assert!(s.is_on_duty("Grup 3", sunday, COMMUNAL));
        assert!(s.is_on_duty("Grup 1", monday, COMMUNAL));
        assert!(!s.is_on_duty("Grup 2", monday, COMMUNAL));
    }

    #[test]
    fn test_to_days_lists_all_weekdays() {
        let mut s = DutySchedule::new();
        s.set_day(3, vec!["X".into()]).unwrap();
        let days = s.to_days();
        assert_eq!(days.len(), 7);
        assert_eq!(days[3].day_name, "Wednesday");
        assert_eq!(days[3].groups, vec!["X".to_string()]);
        assert!(days[0].groups.is_empty());
    }

    #[test]
    fn test_group_names_distinct() {
        let s = DutySchedule::default_roster(COMMUNAL);
        let names = s.group_names();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"Grup 2"));
    }
}
