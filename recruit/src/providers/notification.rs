//! Notification dispatcher trait and the message it sends.

use crate::error::NotificationError;
use serde::{Deserialize, Serialize};

/// A fully rendered mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailInfo {
    /// `Name<address>`.
    pub sender: String,
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// HTML alternative.
    pub html_body: String,
    /// Plain text alternative.
    pub text_body: String,
    /// Character set of both bodies.
    pub charset: String,
}

/// Mail transport.
///
/// Failures come back categorized; callers log them and move on.
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns the [`NotificationError`] category matching the transport failure.
    fn send(
        &self,
        message: &MailInfo,
    ) -> impl std::future::Future<Output = Result<(), NotificationError>> + Send;
}
