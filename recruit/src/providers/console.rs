//! Console notification dispatcher for development.

use crate::error::NotificationError;
use crate::providers::{MailInfo, NotificationDispatcher};
use tracing::{debug, info};

/// Logs notices instead of sending them.
///
/// # Examples
///
/// ```ignore
/// use guildhack_recruit::providers::ConsoleNotificationDispatcher;
///
/// let dispatcher = ConsoleNotificationDispatcher::new();
/// dispatcher.send(&mail).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotificationDispatcher;

impl ConsoleNotificationDispatcher {
    /// Create a new console dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NotificationDispatcher for ConsoleNotificationDispatcher {
    async fn send(&self, message: &MailInfo) -> Result<(), NotificationError> {
        info!(
            from = %message.sender,
            to = %message.recipient,
            subject = %message.subject,
            "📧 Notice (development mode)"
        );
        debug!(body = %message.text_body, "Notice body");
        Ok(())
    }
}
