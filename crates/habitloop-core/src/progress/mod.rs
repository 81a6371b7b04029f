//! Collection-wide progress aggregation.
//!
//! Everything here is a pure, total function over decoded habits: a record
//! that lost its schedule on the way in is simply never due, so no
//! aggregation pass can crash on malformed data.

pub mod color;
pub mod heatmap;

pub use color::Rgb;
pub use heatmap::{month_grid, HeatmapCell, HeatmapPalette};

use chrono::NaiveDate;

use crate::habit::Habit;

/// Habits due on `date` (the "due set").
pub fn due_set<'a>(habits: &'a [Habit], date: NaiveDate) -> Vec<&'a Habit> {
    habits.iter().filter(|h| h.is_due(date)).collect()
}

/// Fraction of the due set completed on `date`, in [0, 1].
///
/// Defined as 0 when nothing is due -- a policy decision, so that an empty
/// day renders as "nothing done" rather than NaN or a skipped cell.
pub fn completion_ratio(habits: &[Habit], date: NaiveDate) -> f64 {
    let due = due_set(habits, date);
    if due.is_empty() {
        return 0.0;
    }
    let done = due.iter().filter(|h| h.ledger.is_completed(date)).count();
    done as f64 / due.len() as f64
}

/// A ratio as a display percentage, rounded to the nearest integer.
pub fn percent(ratio: f64) -> u8 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Today's aggregate percentage for the primary progress indicator.
/// An empty collection yields 0%, not an error.
pub fn today_percent(habits: &[Habit], today: NaiveDate) -> u8 {
    percent(completion_ratio(habits, today))
}

/// Per-habit achievement rate for a calendar month: completed days over
/// days in the month, as an integer percent.
pub fn month_achievement(habit: &Habit, year: i32, month: u32) -> u8 {
    let days = heatmap::month_dates(year, month);
    if days.is_empty() {
        return 0;
    }
    let done = days
        .iter()
        .filter(|d| habit.ledger.is_completed(**d))
        .count();
    percent(done as f64 / days.len() as f64)
}
