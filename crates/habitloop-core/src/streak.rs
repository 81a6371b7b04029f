//! Consecutive-completion streaks over scheduled occurrences.
//!
//! "N-day streak" means N consecutive *scheduled* occurrences completed,
//! ending at today -- not N consecutive calendar dates. A Fridays-only habit
//! accumulates one unit per Friday; a naive daily-diff over the calendar
//! would be wrong for it.

use chrono::{Duration, NaiveDate};

use crate::habit::Habit;

/// Backward-scan ceiling. Unbounded scans are rejected for cost; a year is
/// far past any break point that could still matter.
pub const STREAK_HORIZON_DAYS: i64 = 365;

/// Current streak of consecutive scheduled completions ending at `as_of`.
///
/// Scans backward from `as_of`, skipping non-scheduled days entirely: they
/// neither extend nor break the run. A scheduled past day without a
/// completion breaks the run; an unmarked `as_of` itself does not, because
/// today may still be pending.
pub fn current_streak(habit: &Habit, as_of: NaiveDate) -> u32 {
    if habit.ledger.is_empty() {
        return 0;
    }

    let mut streak = 0;
    for offset in 0..STREAK_HORIZON_DAYS {
        let date = as_of - Duration::days(offset);
        if !habit.is_due(date) {
            continue;
        }
        if habit.ledger.is_completed(date) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
        // offset == 0 and uncompleted: today is still in progress, keep going
    }
    streak
}
