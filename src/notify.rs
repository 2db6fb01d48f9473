//! Notification transport seam.

use anyhow::Result;
use tracing::info;

/// Delivers a pre-formatted, already-escaped message to a list of
/// destinations. Delivery is fire-and-forget from the caller's
/// perspective; errors are logged by the orchestrator, never retried.
pub trait Notifier: Send {
    fn send(&mut self, message: &str, chat_ids: &[String]) -> Result<()>;
}

/// Logs messages instead of delivering them.
///
/// Stands in for a real chat transport while keeping the message
/// contract observable.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&mut self, message: &str, chat_ids: &[String]) -> Result<()> {
        info!(recipients = chat_ids.len(), %message, "notification");
        Ok(())
    }
}
