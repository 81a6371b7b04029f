//! # Habitloop Core Library
//!
//! This library provides the core business logic for the Habitloop habit
//! tracker. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any GUI being a thin layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Schedule evaluation**: pure rules deciding whether a habit is due
//!   on a calendar date (daily, or weekly on listed weekdays)
//! - **Completion ledger**: per-habit set of completed calendar dates
//! - **Streaks & progress**: consecutive scheduled-occurrence streaks and
//!   collection-wide completion ratios, including the month heat-map
//! - **Reminders**: timer registry with structural cancel-before-rearm
//! - **Store adapters**: SQLite-backed local store and a JSON REST client
//!   for the hosted store, behind one `HabitStore` trait
//!
//! ## Key Components
//!
//! - [`Session`]: session-scoped engine over one user's collection
//! - [`Habit`] / [`Schedule`]: the decoded data model
//! - [`ReminderScheduler`]: reminder timer state machine
//! - [`HabitStore`]: load/mutate boundary to persistence

pub mod auth;
pub mod config;
pub mod error;
pub mod habit;
pub mod ledger;
pub mod notify;
pub mod progress;
pub mod record;
pub mod session;
pub mod store;
pub mod streak;

pub use auth::{AuthClient, AuthSession, AuthState};
pub use config::Config;
pub use error::{
    AuthError, ConfigError, CoreError, NotifyError, Result, StoreError, ValidationError,
};
pub use habit::{weekday0, Habit, HabitId, Reminder, Schedule, TimeOfDay};
pub use ledger::CompletionLedger;
pub use notify::{next_fire_at, LogSink, NotificationSink, ReminderScheduler, TimerState};
pub use progress::{
    completion_ratio, due_set, month_achievement, month_grid, today_percent, HeatmapCell,
    HeatmapPalette, Rgb,
};
pub use record::{HabitDraft, HabitPatch, HabitRecord};
pub use session::{Session, SessionConfig};
pub use store::{HabitStore, LocalStore, RemoteStore, UserId};
pub use streak::{current_streak, STREAK_HORIZON_DAYS};
