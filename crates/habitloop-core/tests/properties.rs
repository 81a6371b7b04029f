//! Property tests over the pure engine: schedule totality, ledger
//! round-trips, streak monotonicity, ratio bounds.

use chrono::NaiveDate;
use habitloop_core::{
    completion_ratio, current_streak, CompletionLedger, Habit, HabitId, Reminder, Schedule,
};
use proptest::prelude::*;

fn any_date() -> impl Strategy<Value = NaiveDate> {
    // Roughly 1918..2082, well past the streak horizon on both sides.
    (700_000i32..760_000).prop_map(|n| NaiveDate::from_num_days_from_ce_opt(n).unwrap())
}

fn any_schedule() -> impl Strategy<Value = Schedule> {
    prop_oneof![
        Just(Schedule::Daily),
        proptest::collection::btree_set(0u8..7, 1..=7).prop_map(|days| Schedule::Weekly {
            days: days.into_iter().collect(),
        }),
    ]
}

fn habit(schedule: Schedule, completed: Vec<NaiveDate>) -> Habit {
    Habit {
        id: HabitId::new(),
        title: "prop".to_string(),
        description: String::new(),
        schedule: Some(schedule),
        reminder: Reminder::off(),
        start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        ledger: completed.into_iter().collect(),
    }
}

proptest! {
    #[test]
    fn is_scheduled_is_total(schedule in any_schedule(), date in any_date()) {
        // Returns a bool for any valid date, never panics.
        let _ = schedule.is_scheduled(date);
    }

    #[test]
    fn double_toggle_restores_the_exact_ledger(
        dates in proptest::collection::vec(any_date(), 0..20),
        date in any_date(),
    ) {
        let mut ledger: CompletionLedger = dates.into_iter().collect();
        let before = ledger.clone();
        ledger.toggle(date);
        ledger.toggle(date);
        prop_assert_eq!(ledger, before);
    }

    #[test]
    fn completing_today_never_decreases_the_streak(
        schedule in any_schedule(),
        dates in proptest::collection::vec(any_date(), 0..30),
        today in any_date(),
    ) {
        let mut h = habit(schedule, dates);
        if h.ledger.is_completed(today) {
            h.ledger.toggle(today);
        }
        let before = current_streak(&h, today);
        h.ledger.toggle(today);
        let after = current_streak(&h, today);
        prop_assert!(after >= before);

        // And un-completing it never increases the streak.
        h.ledger.toggle(today);
        prop_assert_eq!(current_streak(&h, today), before);
    }

    #[test]
    fn ratio_stays_in_the_unit_interval(
        schedules in proptest::collection::vec(any_schedule(), 0..6),
        dates in proptest::collection::vec(any_date(), 0..30),
        day in any_date(),
    ) {
        let habits: Vec<Habit> = schedules
            .into_iter()
            .map(|s| habit(s, dates.clone()))
            .collect();
        let ratio = completion_ratio(&habits, day);
        prop_assert!((0.0..=1.0).contains(&ratio));
    }
}
