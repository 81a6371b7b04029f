//! Reminder timers with an owned registry.
//!
//! The scheduler arms at most one timer per habit and structurally
//! guarantees cancel-before-rearm: `rearm` always drains the registry
//! before arming anything, so a data refresh or logout can never leave a
//! duplicate or stale timer behind.
//!
//! ## Timer states
//!
//! ```text
//! Armed -> Fired      (the sleep elapsed and the sink was invoked)
//!       -> Cancelled  (rearm/teardown aborted it first)
//! ```

pub mod sink;

pub use sink::{LogSink, NotificationSink};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::habit::{Habit, HabitId};

/// Lifecycle of one armed reminder timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Armed,
    /// Terminal for the day; a later `rearm` plans the next occurrence.
    Fired,
    Cancelled,
}

struct ReminderTimer {
    fire_at: DateTime<Local>,
    state: TimerState,
    handle: JoinHandle<()>,
}

type Registry = Arc<Mutex<HashMap<HabitId, ReminderTimer>>>;

/// Session-scoped timer registry. Initialized empty at session start and
/// drained at teardown; timers never survive a logout/login cycle.
pub struct ReminderScheduler {
    sink: Arc<dyn NotificationSink>,
    timers: Registry,
}

impl ReminderScheduler {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of timers currently in the `Armed` state.
    pub fn armed_count(&self) -> usize {
        self.timers
            .lock()
            .map(|t| t.values().filter(|t| t.state == TimerState::Armed).count())
            .unwrap_or(0)
    }

    /// Planned fire instant for `id`, if a timer is armed for it.
    pub fn armed_for(&self, id: HabitId) -> Option<DateTime<Local>> {
        self.timers
            .lock()
            .ok()
            .and_then(|t| match t.get(&id) {
                Some(timer) if timer.state == TimerState::Armed => Some(timer.fire_at),
                _ => None,
            })
    }

    /// Cancel everything, then arm one fresh timer per eligible habit.
    ///
    /// Eligible: reminder enabled with a time, and a next scheduled
    /// occurrence strictly after `now` within the planning window. Safe to
    /// call repeatedly; two back-to-back calls with the same collection
    /// leave exactly one armed timer per eligible habit.
    ///
    /// Must run inside a tokio runtime.
    pub fn rearm(&self, habits: &[Habit], now: DateTime<Local>) {
        self.cancel_all();

        if !self.sink.available() {
            warn!("notifications unavailable on this platform, arming nothing");
            return;
        }

        for habit in habits {
            let Some(fire_at) = next_fire_at(habit, now) else {
                continue;
            };
            let delay = (fire_at - now).to_std().unwrap_or_default();
            let id = habit.id;
            let title = habit.title.clone();
            let body = if habit.description.is_empty() {
                "Time for your habit".to_string()
            } else {
                habit.description.clone()
            };
            let sink = Arc::clone(&self.sink);
            let registry = Arc::clone(&self.timers);

            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = sink.notify(&title, &body) {
                    // Fire-and-forget: log, no retry, no escalation.
                    warn!(habit = %id, error = %e, "reminder delivery failed");
                }
                if let Ok(mut timers) = registry.lock() {
                    if let Some(timer) = timers.get_mut(&id) {
                        timer.state = TimerState::Fired;
                    }
                }
            });

            debug!(habit = %id, %fire_at, "armed reminder");
            if let Ok(mut timers) = self.timers.lock() {
                timers.insert(
                    id,
                    ReminderTimer {
                        fire_at,
                        state: TimerState::Armed,
                        handle,
                    },
                );
            }
        }
    }

    /// Cancel every registered timer and clear the registry. A no-op when
    /// nothing is armed; safe from any teardown path.
    pub fn cancel_all(&self) {
        let Ok(mut timers) = self.timers.lock() else {
            return;
        };
        for (_, mut timer) in timers.drain() {
            if timer.state == TimerState::Armed {
                timer.state = TimerState::Cancelled;
                timer.handle.abort();
            }
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Pure planning half of the scheduler: the earliest instant strictly
/// after `now` that falls on a scheduled date at the habit's reminder
/// time. Rolls forward day by day for up to a week, so a time that already
/// passed today arms for the next occurrence instead of silently waiting
/// for the next reload.
pub fn next_fire_at(habit: &Habit, now: DateTime<Local>) -> Option<DateTime<Local>> {
    if !habit.reminder.enabled {
        return None;
    }
    let time = habit.reminder.time?;

    for offset in 0..7 {
        let date = now.date_naive() + Duration::days(offset);
        if !habit.is_due(date) {
            continue;
        }
        // DST gaps can make a local wall-clock time unrepresentable; skip
        // that day rather than firing at the wrong instant.
        let Some(fire_at) = Local
            .from_local_datetime(&date.and_time(time.time()))
            .earliest()
        else {
            continue;
        };
        if fire_at > now {
            return Some(fire_at);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::habit::{Reminder, Schedule, TimeOfDay};
    use crate::ledger::CompletionLedger;
    use chrono::NaiveDate;

    fn habit(schedule: Option<Schedule>, reminder: Reminder) -> Habit {
        Habit {
            id: HabitId::new(),
            title: "Drink water".to_string(),
            description: String::new(),
            schedule,
            reminder,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ledger: CompletionLedger::new(),
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(h, min, 0)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    fn at(s: &str) -> Reminder {
        Reminder::at(TimeOfDay::parse(s).unwrap())
    }

    #[test]
    fn plans_later_today_when_time_is_still_ahead() {
        let h = habit(Some(Schedule::Daily), at("21:00"));
        let now = local(2025, 10, 17, 9, 0);
        assert_eq!(next_fire_at(&h, now), Some(local(2025, 10, 17, 21, 0)));
    }

    #[test]
    fn rolls_forward_when_time_passed_today() {
        let h = habit(Some(Schedule::Daily), at("08:00"));
        let now = local(2025, 10, 17, 9, 0);
        assert_eq!(next_fire_at(&h, now), Some(local(2025, 10, 18, 8, 0)));
    }

    #[test]
    fn rolls_forward_to_the_next_scheduled_day() {
        // Friday-only habit, asked on a Friday after the reminder time:
        // next occurrence is next Friday.
        let h = habit(Some(Schedule::Weekly { days: vec![5] }), at("08:00"));
        let now = local(2025, 10, 17, 9, 0);
        assert_eq!(next_fire_at(&h, now), Some(local(2025, 10, 24, 8, 0)));
    }

    #[test]
    fn disabled_or_never_due_habits_plan_nothing() {
        let now = local(2025, 10, 17, 9, 0);
        assert_eq!(
            next_fire_at(&habit(Some(Schedule::Daily), Reminder::off()), now),
            None
        );
        assert_eq!(next_fire_at(&habit(None, at("21:00")), now), None);
    }

    #[test]
    fn exact_reminder_instant_is_not_strictly_after_now() {
        let h = habit(Some(Schedule::Daily), at("09:00"));
        let now = local(2025, 10, 17, 9, 0);
        assert_eq!(next_fire_at(&h, now), Some(local(2025, 10, 18, 9, 0)));
    }

    struct CountingSink(Mutex<Vec<String>>);

    impl NotificationSink for CountingSink {
        fn notify(&self, title: &str, _body: &str) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(title.to_string());
            Ok(())
        }
    }

    struct DeniedSink;

    impl NotificationSink for DeniedSink {
        fn available(&self) -> bool {
            false
        }

        fn notify(&self, _: &str, _: &str) -> Result<(), NotifyError> {
            Err(NotifyError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn rearm_twice_leaves_one_timer_per_eligible_habit() {
        let scheduler = ReminderScheduler::new(Arc::new(CountingSink(Mutex::new(Vec::new()))));
        let habits = vec![
            habit(Some(Schedule::Daily), at("23:59")),
            habit(Some(Schedule::Daily), at("23:58")),
            habit(Some(Schedule::Daily), Reminder::off()),
        ];
        let now = local(2025, 10, 17, 0, 1);

        scheduler.rearm(&habits, now);
        assert_eq!(scheduler.armed_count(), 2);
        scheduler.rearm(&habits, now);
        assert_eq!(scheduler.armed_count(), 2);

        scheduler.cancel_all();
        assert_eq!(scheduler.armed_count(), 0);
        // Calling cancel_all with nothing armed is a no-op.
        scheduler.cancel_all();
    }

    #[tokio::test]
    async fn permission_denied_arms_nothing() {
        let scheduler = ReminderScheduler::new(Arc::new(DeniedSink));
        let habits = vec![habit(Some(Schedule::Daily), at("23:59"))];
        scheduler.rearm(&habits, local(2025, 10, 17, 0, 1));
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn armed_timer_fires_through_the_sink() {
        let sink = Arc::new(CountingSink(Mutex::new(Vec::new())));
        let scheduler = ReminderScheduler::new(sink.clone());
        let h = habit(Some(Schedule::Daily), at("23:59"));
        let id = h.id;
        let now = local(2025, 10, 17, 0, 0);

        scheduler.rearm(&[h], now);
        assert!(scheduler.armed_for(id).is_some());

        // Jump paused time past the longest possible same-day delay.
        tokio::time::advance(std::time::Duration::from_secs(60 * 60 * 24)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(sink.0.lock().unwrap().as_slice(), ["Drink water"]);
        assert_eq!(scheduler.armed_count(), 0); // fired, no longer armed
        assert_eq!(scheduler.armed_for(id), None);
    }
}
