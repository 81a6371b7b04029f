//! The habit data model.
//!
//! Everything downstream of the store boundary (streaks, progress,
//! reminders) operates on the strict types in this module. Loose records
//! coming off the wire are converted by [`crate::record::HabitRecord::decode`]
//! so that malformed data never reaches the aggregation passes.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::ledger::CompletionLedger;

/// Opaque habit identifier, assigned at creation, immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for HabitId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Weekday number for `date`, 0=Sunday .. 6=Saturday.
///
/// This numbering is a compatibility requirement: stored `days` values are
/// persisted integers interpreted by this convention at every call site.
pub fn weekday0(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Recurrence rule governing which calendar dates a habit is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schedule {
    /// Occurs every calendar date
    Daily,
    /// Occurs only on the listed weekdays (0=Sunday .. 6=Saturday)
    Weekly { days: Vec<u8> },
}

impl Schedule {
    /// Whether `date` is a scheduled occurrence of this rule.
    ///
    /// Total over any valid calendar date; no side effects.
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        match self {
            Schedule::Daily => true,
            Schedule::Weekly { days } => days.contains(&weekday0(date)),
        }
    }

    /// Validate the invariants a user mutation must hold: a weekly schedule
    /// keeps a non-empty set of in-range weekdays.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Schedule::Weekly { days } = self {
            if days.is_empty() {
                return Err(ValidationError::EmptyWeekdaySet);
            }
            if let Some(&bad) = days.iter().find(|d| **d > 6) {
                return Err(ValidationError::InvalidWeekday(bad));
            }
        }
        Ok(())
    }
}

/// Wall-clock time of day, carried on the wire as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidTime {
                value: s.to_string(),
            })
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Per-habit reminder settings. `time` is required whenever `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reminder {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeOfDay>,
}

impl Reminder {
    pub fn off() -> Self {
        Self::default()
    }

    pub fn at(time: TimeOfDay) -> Self {
        Self {
            enabled: true,
            time: Some(time),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.time.is_none() {
            return Err(ValidationError::ReminderWithoutTime);
        }
        Ok(())
    }
}

/// A habit as the engine sees it: decoded, deduplicated, defensively
/// defaulted.
///
/// `schedule == None` is the "never due" default substituted when a loaded
/// record was missing or carried a malformed schedule. It keeps every
/// aggregation pass total without a crash path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    pub description: String,
    pub schedule: Option<Schedule>,
    pub reminder: Reminder,
    /// Creation date; informational, does not gate scheduling.
    pub start_date: NaiveDate,
    pub ledger: CompletionLedger,
}

impl Habit {
    /// Whether this habit is due on `date`. A habit without a valid
    /// schedule is never due.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.schedule.as_ref().is_some_and(|s| s.is_scheduled(date))
    }

    /// Validate the user-mutable invariants (title, schedule, reminder).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(schedule) = &self.schedule {
            schedule.validate()?;
        }
        self.reminder.validate()
    }
}
