// # Notifier Trait
//
// Defines the interface for update notifications.
//
// ## Implementations
//
// - Telegram chat-bot, Discord webhook: `cfddns-notify` crate
//
// ## Contract
//
// Notification is fire-and-forget relative to the reconciliation result:
// the engine logs a failed channel and carries on. A failure on one channel
// must not prevent the engine from attempting the others, and must never
// fail the cycle that triggered it.

use async_trait::async_trait;

/// Trait for notification channel implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to this channel
    ///
    /// Implementations make a single outbound call and report its outcome;
    /// the engine decides what to do with a failure (log it).
    async fn notify(&self, message: &str) -> Result<(), crate::Error>;

    /// Get the channel name (for logging/debugging)
    fn channel_name(&self) -> &'static str;
}
