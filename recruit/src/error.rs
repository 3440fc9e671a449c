//! Error types for recruit board operations.

use crate::state::{RecruitId, UserId};
use guildhack_runtime::StoreError;
use thiserror::Error;

/// Result type alias for recruit board operations.
pub type Result<T> = std::result::Result<T, RecruitError>;

/// Errors surfaced by stores, the directory and the join/create workflows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecruitError {
    /// A required request field was absent or empty.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// Which field was wrong
        reason: String,
    },

    /// No active recruit matched the identifier.
    #[error("Recruit {0} not found")]
    RecruitNotFound(RecruitId),

    /// No user matched the identifier.
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// The counter or the recruit store could not complete the operation.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A notification could not be delivered.
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// The store runtime rejected or lost the request.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Internal error (lock poisoning and similar).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecruitError {
    /// Shorthand for [`RecruitError::InvalidRequest`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Returns `true` for either kind of missing record.
    ///
    /// ```
    /// # use guildhack_recruit::{RecruitError, RecruitId};
    /// assert!(RecruitError::RecruitNotFound(RecruitId(3)).is_not_found());
    /// assert!(!RecruitError::invalid("uid").is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RecruitNotFound(_) | Self::UserNotFound(_))
    }

    /// Returns `true` if the caller sent something unusable.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }

    /// Returns `true` if repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<StoreError> for RecruitError {
    fn from(error: StoreError) -> Self {
        Self::Runtime(error.to_string())
    }
}

/// Categorized mail transport failure.
///
/// Logged by the join workflow and never turned into a failed join.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The transport refused the message.
    #[error("Message rejected: {0}")]
    MessageRejected(String),

    /// The sender address or its domain is not verified with the transport.
    #[error("Sender domain not verified: {0}")]
    SenderDomainUnverified(String),

    /// Transport credentials, addresses or settings are wrong.
    #[error("Mail configuration error: {0}")]
    Configuration(String),

    /// Any other transport failure.
    #[error("Mail transport error: {0}")]
    Transport(String),
}

impl NotificationError {
    /// Short category name used in log fields.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::MessageRejected(_) => "message_rejected",
            Self::SenderDomainUnverified(_) => "sender_domain_unverified",
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifiers() {
        assert!(RecruitError::invalid("position is required").is_user_error());
        assert!(RecruitError::UserNotFound(UserId::from("u9")).is_not_found());
        assert!(RecruitError::StorageUnavailable("down".into()).is_retryable());
        assert!(!RecruitError::RecruitNotFound(RecruitId(1)).is_retryable());
    }

    #[test]
    fn store_errors_become_runtime_errors() {
        let err: RecruitError = StoreError::Timeout.into();
        assert!(matches!(err, RecruitError::Runtime(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn notification_error_is_transparent() {
        let err: RecruitError = NotificationError::MessageRejected("550 spam".into()).into();
        assert_eq!(err.to_string(), "Message rejected: 550 spam");
        assert_eq!(
            NotificationError::SenderDomainUnverified(String::new()).category(),
            "sender_domain_unverified"
        );
    }
}
