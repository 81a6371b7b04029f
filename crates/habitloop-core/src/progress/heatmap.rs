//! Calendar-month heat-map of due-set completion ratios.
//!
//! The grid covers full display weeks, Sunday-first: leading and trailing
//! out-of-month days are included so every row renders seven cells.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::habit::{weekday0, Habit};
use crate::progress::color::Rgb;
use crate::progress::completion_ratio;

/// Endpoint colors for ratio interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapPalette {
    pub zero: Rgb,
    pub full: Rgb,
}

impl Default for HeatmapPalette {
    fn default() -> Self {
        HeatmapPalette {
            zero: Rgb { r: 0xf0, g: 0xf0, b: 0xf0 },
            full: Rgb { r: 0x48, g: 0xbb, b: 0x78 },
        }
    }
}

impl HeatmapPalette {
    pub fn color_for(&self, ratio: f64) -> Rgb {
        self.zero.lerp(self.full, ratio)
    }
}

/// One day cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days padding the display weeks.
    pub in_month: bool,
    /// Size of the due set on this date.
    pub due_count: usize,
    /// Due-set completion ratio; 0 when nothing is due.
    pub ratio: f64,
    pub color: Rgb,
    /// In-month day with an empty due set: rendered at the zero color with
    /// reduced opacity rather than omitted.
    pub dimmed: bool,
}

/// Every date of `year`/`month`, first through last.
pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut dates = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == month {
        dates.push(day);
        day += Duration::days(1);
    }
    dates
}

/// The month heat-map: one cell per display-grid date, in order, always a
/// multiple of seven. An invalid `year`/`month` yields an empty grid.
pub fn month_grid(
    habits: &[Habit],
    year: i32,
    month: u32,
    palette: &HeatmapPalette,
) -> Vec<HeatmapCell> {
    let days = month_dates(year, month);
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Vec::new();
    };

    let grid_start = *first - Duration::days(weekday0(*first) as i64);
    let grid_end = *last + Duration::days((6 - weekday0(*last)) as i64);

    let mut cells = Vec::new();
    let mut day = grid_start;
    while day <= grid_end {
        let due_count = habits.iter().filter(|h| h.is_due(day)).count();
        let ratio = completion_ratio(habits, day);
        let in_month = day.month() == month;
        cells.push(HeatmapCell {
            date: day,
            in_month,
            due_count,
            ratio,
            color: palette.color_for(ratio),
            dimmed: in_month && due_count == 0,
        });
        day += Duration::days(1);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{HabitId, Reminder, Schedule};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(schedule: Schedule, completed: &[NaiveDate]) -> Habit {
        Habit {
            id: HabitId::new(),
            title: "test".to_string(),
            description: String::new(),
            schedule: Some(schedule),
            reminder: Reminder::off(),
            start_date: date(2025, 1, 1),
            ledger: completed.iter().copied().collect(),
        }
    }

    #[test]
    fn grid_covers_full_weeks_sunday_first() {
        // October 2025 starts on a Wednesday and ends on a Friday.
        let grid = month_grid(&[], 2025, 10, &HeatmapPalette::default());
        assert_eq!(grid.len() % 7, 0);
        assert_eq!(grid.len(), 35);
        assert_eq!(grid.first().unwrap().date, date(2025, 9, 28));
        assert_eq!(grid.last().unwrap().date, date(2025, 11, 1));
        assert!(!grid.first().unwrap().in_month);
        assert!(grid.iter().filter(|c| c.in_month).count() == 31);
    }

    #[test]
    fn completed_day_gets_the_full_color() {
        let day = date(2025, 10, 17);
        let habits = vec![habit(Schedule::Daily, &[day])];
        let palette = HeatmapPalette::default();
        let grid = month_grid(&habits, 2025, 10, &palette);
        let cell = grid.iter().find(|c| c.date == day).unwrap();
        assert_eq!(cell.ratio, 1.0);
        assert_eq!(cell.color, palette.full);
        assert!(!cell.dimmed);
    }

    #[test]
    fn off_schedule_day_is_dimmed_zero_color() {
        // Friday-only habit: a Tuesday in-month cell has nothing due.
        let habits = vec![habit(Schedule::Weekly { days: vec![5] }, &[])];
        let palette = HeatmapPalette::default();
        let grid = month_grid(&habits, 2025, 10, &palette);
        let tuesday = grid.iter().find(|c| c.date == date(2025, 10, 14)).unwrap();
        assert_eq!(tuesday.due_count, 0);
        assert_eq!(tuesday.ratio, 0.0);
        assert_eq!(tuesday.color, palette.zero);
        assert!(tuesday.dimmed);
    }

    #[test]
    fn half_done_day_interpolates() {
        let day = date(2025, 10, 17);
        let habits = vec![
            habit(Schedule::Daily, &[day]),
            habit(Schedule::Daily, &[]),
        ];
        let palette = HeatmapPalette::default();
        let grid = month_grid(&habits, 2025, 10, &palette);
        let cell = grid.iter().find(|c| c.date == day).unwrap();
        assert_eq!(cell.ratio, 0.5);
        assert_eq!(cell.color, palette.zero.lerp(palette.full, 0.5));
    }

    #[test]
    fn invalid_month_yields_empty_grid() {
        assert!(month_grid(&[], 2025, 13, &HeatmapPalette::default()).is_empty());
    }
}
