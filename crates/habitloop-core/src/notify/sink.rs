//! Local notification delivery boundary.

use tracing::info;

use crate::error::NotifyError;

/// Platform primitive the scheduler delivers through. Fire-and-forget:
/// the engine receives no delivery confirmation and never retries.
pub trait NotificationSink: Send + Sync {
    /// Whether the platform currently allows local notifications.
    /// False (permission denied) degrades to "nothing armed".
    fn available(&self) -> bool {
        true
    }

    /// Deliver a notification now.
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sink that writes notifications to the log. Used by the CLI and as the
/// default when no platform sink is wired up.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(%title, %body, "reminder");
        Ok(())
    }
}
