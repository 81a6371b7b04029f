//! Habit store adapter boundary.
//!
//! The engine operates over an abstract load/mutate interface; persistence
//! details stay behind it. `subscribe` pushes the full, authoritative
//! collection on the initial load and after every mutation -- the session
//! replaces its in-memory view on each push.

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::habit::HabitId;
use crate::record::{HabitDraft, HabitPatch, HabitRecord};

/// Stable identifier supplied by the identity boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Abstract load/mutate interface over the user's habit collection.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Current collection plus a push on every subsequent change. The
    /// receiver's initial value is the load-time snapshot.
    async fn subscribe(
        &self,
        user: &UserId,
    ) -> Result<watch::Receiver<Vec<HabitRecord>>, StoreError>;

    /// Persist a new habit; the store assigns the id.
    async fn create(&self, user: &UserId, draft: HabitDraft) -> Result<HabitId, StoreError>;

    /// Apply a partial update to one habit.
    async fn update(&self, user: &UserId, id: HabitId, patch: HabitPatch)
        -> Result<(), StoreError>;

    /// Remove one habit. Terminal and non-recoverable.
    async fn delete(&self, user: &UserId, id: HabitId) -> Result<(), StoreError>;
}

/// Returns `~/.config/habitloop[-dev]/` based on HABITLOOP_ENV.
///
/// Set HABITLOOP_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitloop-dev")
    } else {
        base_dir.join("habitloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
