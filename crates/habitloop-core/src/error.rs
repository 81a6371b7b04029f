//! Core error types for habitloop-core.
//!
//! This module defines the error hierarchy using thiserror. Note that the
//! pure computations (schedule evaluation, streaks, progress aggregation)
//! are total and never return an error; the variants here cover mutation
//! validation and the store/identity/notification boundaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::habit::HabitId;

/// Core error type for habitloop-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed user input; the mutation was rejected and state unchanged
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Store adapter failures
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity boundary failures
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Notification delivery failures
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Rejected user input. Recovered locally: surface the message, re-prompt,
/// leave state unchanged.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Habit title must not be empty")]
    EmptyTitle,

    #[error("Weekly schedule must include at least one day")]
    EmptyWeekdaySet,

    #[error("Invalid weekday {0}: expected 0 (Sunday) through 6 (Saturday)")]
    InvalidWeekday(u8),

    #[error("Invalid time of day '{value}': expected HH:MM")]
    InvalidTime { value: String },

    #[error("Reminder is enabled but no time of day is set")]
    ReminderWithoutTime,
}

/// Store adapter errors. An `Unavailable` failure after an optimistic
/// mutation is reported upward, never swallowed; the in-memory state is
/// deliberately not rolled back (the next successful sync reconciles).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or timed out
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but refused the request
    #[error("Store rejected the request: HTTP {status}")]
    Rejected { status: u16 },

    /// Unknown habit id
    #[error("Habit {0} not found")]
    NotFound(HabitId),

    /// A stored record could not be decoded at all
    #[error("Failed to decode habit record: {0}")]
    Decode(String),

    /// Local database errors
    #[error("Database error: {0}")]
    Database(String),
}

/// Identity boundary errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Identity provider unreachable: {0}")]
    Unreachable(String),

    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Notification delivery errors. `PermissionDenied` degrades to "no timers
/// armed" without blocking anything else.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

// Helper implementations for converting from boundary crate errors

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            StoreError::Rejected {
                status: status.as_u16(),
            }
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Unreachable(err.to_string())
    }
}

impl From<keyring::Error> for AuthError {
    fn from(err: keyring::Error) -> Self {
        AuthError::Keyring(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
