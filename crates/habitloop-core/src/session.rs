//! Session-scoped engine over one user's habit collection.
//!
//! No ambient singletons: a [`Session`] is constructed explicitly from the
//! store adapter, notification sink, and configuration, started on
//! successful authentication, and torn down (cancelling every reminder
//! timer) on logout. Reads flow store -> in-memory collection -> pure
//! evaluators; writes are applied optimistically in memory before the
//! store round-trip resolves, so the UI reflects the last action
//! immediately. A store failure is reported upward, never swallowed, and
//! the optimistic state deliberately stands until the next successful sync
//! reconciles it.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::auth::AuthState;
use crate::error::{CoreError, StoreError, ValidationError};
use crate::habit::{Habit, HabitId, TimeOfDay};
use crate::notify::{NotificationSink, ReminderScheduler};
use crate::progress::{self, HeatmapCell, HeatmapPalette};
use crate::record::{HabitDraft, HabitPatch, HabitRecord};
use crate::store::{HabitStore, UserId};
use crate::streak;

/// Session-scoped configuration, derived from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub palette: HeatmapPalette,
    pub notifications_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            palette: HeatmapPalette::default(),
            notifications_enabled: true,
        }
    }
}

pub struct Session {
    user: UserId,
    store: Arc<dyn HabitStore>,
    scheduler: ReminderScheduler,
    config: SessionConfig,
    habits: Vec<Habit>,
    updates: Option<watch::Receiver<Vec<HabitRecord>>>,
}

impl Session {
    pub fn new(
        user: UserId,
        store: Arc<dyn HabitStore>,
        sink: Arc<dyn NotificationSink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            user,
            store,
            scheduler: ReminderScheduler::new(sink),
            config,
            habits: Vec::new(),
            updates: None,
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Subscribe to the store and load the initial snapshot. Called once
    /// authentication has succeeded.
    pub async fn start(&mut self) -> Result<(), CoreError> {
        let rx = self.store.subscribe(&self.user).await?;
        let snapshot = rx.borrow().clone();
        self.updates = Some(rx);
        self.apply_snapshot(snapshot);
        Ok(())
    }

    /// Replace the in-memory view with an authoritative store push and
    /// re-plan every reminder timer.
    pub fn apply_snapshot(&mut self, records: Vec<HabitRecord>) {
        self.habits = records.into_iter().map(HabitRecord::decode).collect();
        debug!(count = self.habits.len(), "applied habit snapshot");
        self.rearm();
    }

    /// Drain a pending store push, if any. Returns whether the view
    /// changed.
    pub fn refresh(&mut self) -> bool {
        let Some(rx) = &mut self.updates else {
            return false;
        };
        if !rx.has_changed().unwrap_or(false) {
            return false;
        }
        let records = rx.borrow_and_update().clone();
        self.apply_snapshot(records);
        true
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Current scheduled-occurrence streak for one habit.
    pub fn streak(&self, id: HabitId) -> Option<u32> {
        self.habit(id)
            .map(|h| streak::current_streak(h, Local::now().date_naive()))
    }

    /// Total completions metric (distinct from the streak).
    pub fn total_completions(&self, id: HabitId) -> Option<usize> {
        self.habit(id).map(|h| h.ledger.count())
    }

    /// Today's aggregate completion percentage.
    pub fn today_percent(&self) -> u8 {
        progress::today_percent(&self.habits, Local::now().date_naive())
    }

    /// Heat-map grid for a calendar month, using the session palette.
    pub fn month_grid(&self, year: i32, month: u32) -> Vec<HeatmapCell> {
        progress::month_grid(&self.habits, year, month, &self.config.palette)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create a habit. Validation failures leave all state unchanged.
    pub async fn create(&mut self, draft: HabitDraft) -> Result<HabitId, CoreError> {
        draft.validate()?;
        let id = self.store.create(&self.user, draft.clone()).await?;
        self.habits.push(draft.into_habit(id));
        self.rearm();
        Ok(id)
    }

    /// Apply a partial edit. The patch is validated against the habit it
    /// would produce before any state changes; an invalid result (empty
    /// title, emptied weekday set, enabled reminder without a time) is
    /// rejected for re-prompting, never stored.
    pub async fn edit(&mut self, id: HabitId, patch: HabitPatch) -> Result<(), CoreError> {
        let idx = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let mut record = HabitRecord::from_habit(&self.habits[idx]);
        patch.apply_to(&mut record);
        validate_record(&record)?;

        self.habits[idx] = record.decode();
        self.rearm();
        self.store.update(&self.user, id, patch).await?;
        Ok(())
    }

    /// Remove a habit. Terminal, non-recoverable.
    pub async fn delete(&mut self, id: HabitId) -> Result<(), CoreError> {
        let idx = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.habits.remove(idx);
        self.rearm();
        self.store.delete(&self.user, id).await?;
        Ok(())
    }

    /// Flip one date in a habit's ledger, optimistically, then persist.
    /// Returns the new completion state.
    pub async fn toggle(&mut self, id: HabitId, date: NaiveDate) -> Result<bool, CoreError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let done = habit.ledger.toggle(date);
        let patch = HabitPatch::completions(&habit.ledger);

        if let Err(e) = self.store.update(&self.user, id, patch).await {
            error!(habit = %id, error = %e, "toggle not persisted, in-memory state kept");
            return Err(e.into());
        }
        Ok(done)
    }

    pub async fn toggle_today(&mut self, id: HabitId) -> Result<bool, CoreError> {
        self.toggle(id, Local::now().date_naive()).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// React to an identity-state push. Any state other than
    /// "authenticated as this session's user" tears the session down.
    pub fn on_auth_change(&mut self, state: AuthState) {
        match state {
            AuthState::Authenticated(user) if user == self.user => {}
            AuthState::Loading => {}
            _ => self.teardown(),
        }
    }

    /// Cancel every reminder timer, drop the store subscription, and
    /// clear the in-memory collection. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.updates = None;
        self.habits.clear();
        debug!(user = %self.user, "session torn down");
    }

    /// Re-plan reminder timers from the current collection.
    pub fn rearm(&self) {
        if self.config.notifications_enabled {
            self.scheduler.rearm(&self.habits, Local::now());
        }
    }

    /// Number of reminder timers currently armed.
    pub fn armed_reminders(&self) -> usize {
        self.scheduler.armed_count()
    }
}

/// Validate the user-mutable fields of a would-be stored record. Only the
/// constraints a user edit can violate are checked; integrity damage
/// already present in the store keeps flowing through the defensive
/// decode instead.
fn validate_record(record: &HabitRecord) -> Result<(), ValidationError> {
    if record.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if let Some(raw) = &record.schedule {
        if raw.kind == "weekly" {
            let days = raw.days.as_deref().unwrap_or_default();
            if days.is_empty() {
                return Err(ValidationError::EmptyWeekdaySet);
            }
            if let Some(&bad) = days.iter().find(|d| **d > 6) {
                return Err(ValidationError::InvalidWeekday(bad));
            }
        }
    }
    if record.notification_on {
        match record.notification_time.as_deref() {
            None => return Err(ValidationError::ReminderWithoutTime),
            Some(s) => {
                TimeOfDay::parse(s)?;
            }
        }
    }
    Ok(())
}
