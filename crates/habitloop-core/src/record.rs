//! Loose wire shape of a stored habit and the decode/validate boundary.
//!
//! Records come from the store adapter as dynamically-shaped JSON: the
//! schedule may be missing or malformed, `completedDates` is an array that
//! may contain duplicates, and the reminder time is a free-form string.
//! [`HabitRecord::decode`] turns that into a strict [`Habit`], substituting
//! the "never due" default for anything broken so the aggregation passes
//! stay total.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::habit::{Habit, HabitId, Reminder, Schedule, TimeOfDay};
use crate::ledger::CompletionLedger;

/// Schedule as stored: the tag is an arbitrary string and `days` may be
/// absent or out of range. Decoding narrows this to [`Schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchedule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u8>>,
}

impl From<&Schedule> for RawSchedule {
    fn from(schedule: &Schedule) -> Self {
        match schedule {
            Schedule::Daily => RawSchedule {
                kind: "daily".to_string(),
                days: None,
            },
            Schedule::Weekly { days } => RawSchedule {
                kind: "weekly".to_string(),
                days: Some(days.clone()),
            },
        }
    }
}

/// A habit exactly as the store transmits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub id: HabitId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Option<RawSchedule>,
    #[serde(default)]
    pub notification_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<String>,
    /// ISO 8601; legacy records store a full timestamp, newer ones a date.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub completed_dates: Vec<String>,
}

impl HabitRecord {
    /// Strict decode step: every downstream component receives only the
    /// well-formed [`Habit`] this produces. Integrity violations degrade
    /// (never-due schedule, disabled reminder, skipped dates) and are
    /// logged, never propagated as errors.
    pub fn decode(self) -> Habit {
        let schedule = self.decode_schedule();
        let reminder = self.decode_reminder();
        let start_date = parse_date(&self.start_date)
            .unwrap_or_else(|| Local::now().date_naive());
        let ledger: CompletionLedger = self
            .completed_dates
            .iter()
            .filter_map(|s| {
                let parsed = parse_date(s);
                if parsed.is_none() {
                    warn!(habit = %self.id, value = %s, "skipping unparseable completion date");
                }
                parsed
            })
            .collect();

        Habit {
            id: self.id,
            title: self.title,
            description: self.description,
            schedule,
            reminder,
            start_date,
            ledger,
        }
    }

    fn decode_schedule(&self) -> Option<Schedule> {
        let raw = match &self.schedule {
            Some(raw) => raw,
            None => {
                warn!(habit = %self.id, "record has no schedule, treating as never due");
                return None;
            }
        };
        match raw.kind.as_str() {
            "daily" => Some(Schedule::Daily),
            "weekly" => {
                let mut days: Vec<u8> = raw
                    .days
                    .clone()
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|d| *d <= 6)
                    .collect();
                days.sort_unstable();
                days.dedup();
                if days.is_empty() {
                    warn!(habit = %self.id, "weekly schedule has no valid days, treating as never due");
                    None
                } else {
                    Some(Schedule::Weekly { days })
                }
            }
            other => {
                warn!(habit = %self.id, kind = %other, "unknown schedule type, treating as never due");
                None
            }
        }
    }

    fn decode_reminder(&self) -> Reminder {
        if !self.notification_on {
            return Reminder::off();
        }
        match self.notification_time.as_deref().map(TimeOfDay::parse) {
            Some(Ok(time)) => Reminder::at(time),
            _ => {
                warn!(habit = %self.id, "enabled reminder has no valid time, disabling");
                Reminder::off()
            }
        }
    }

    /// Inverse of [`decode`](Self::decode), for writing back through the
    /// store adapter.
    pub fn from_habit(habit: &Habit) -> Self {
        HabitRecord {
            id: habit.id,
            title: habit.title.clone(),
            description: habit.description.clone(),
            schedule: habit.schedule.as_ref().map(RawSchedule::from),
            notification_on: habit.reminder.enabled,
            notification_time: habit.reminder.time.map(|t| t.to_string()),
            start_date: habit.start_date.format("%Y-%m-%d").to_string(),
            completed_dates: habit
                .ledger
                .dates()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full ISO timestamp (legacy `startDate` values).
/// Byte 10 may land inside a multi-byte character on arbitrary wire input;
/// `get` turns that into a decode failure instead of a slice panic.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let date_part = if s.len() > 10 { s.get(..10)? } else { s };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// A new habit before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub schedule: Schedule,
    #[serde(default)]
    pub reminder: Reminder,
}

impl HabitDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        self.schedule.validate()?;
        self.reminder.validate()
    }

    /// Materialize the draft once the store has assigned `id`.
    pub fn into_habit(self, id: HabitId) -> Habit {
        Habit {
            id,
            title: self.title,
            description: self.description,
            schedule: Some(self.schedule),
            reminder: self.reminder,
            start_date: Local::now().date_naive(),
            ledger: CompletionLedger::new(),
        }
    }
}

/// Partial update for `update(user, id, patch)`. Absent fields are left
/// untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_dates: Option<Vec<String>>,
}

impl HabitPatch {
    /// Patch carrying only a replaced completion ledger (the toggle path).
    pub fn completions(ledger: &CompletionLedger) -> Self {
        HabitPatch {
            completed_dates: Some(
                ledger
                    .dates()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &HabitPatch::default()
    }

    /// Field-wise application onto a stored record.
    pub fn apply_to(&self, record: &mut HabitRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(schedule) = &self.schedule {
            record.schedule = Some(RawSchedule::from(schedule));
        }
        if let Some(on) = self.notification_on {
            record.notification_on = on;
        }
        if let Some(time) = &self.notification_time {
            record.notification_time = Some(time.clone());
        }
        if let Some(dates) = &self.completed_dates {
            record.completed_dates = dates.clone();
        }
    }
}
