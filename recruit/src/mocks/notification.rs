//! Recording notification dispatcher.

use crate::error::NotificationError;
use crate::providers::{MailInfo, NotificationDispatcher};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Log {
    attempts: Vec<MailInfo>,
    sent: Vec<MailInfo>,
    failures: HashMap<String, NotificationError>,
}

/// Dispatcher that keeps every message instead of sending it.
///
/// Failures can be scripted per recipient address.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    log: Arc<Mutex<Log>>,
}

impl RecordingDispatcher {
    /// Create a dispatcher that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every message addressed to `recipient` with `error`.
    pub fn fail_for(&self, recipient: impl Into<String>, error: NotificationError) {
        if let Ok(mut log) = self.log.lock() {
            log.failures.insert(recipient.into(), error);
        }
    }

    /// Messages that were accepted.
    #[must_use]
    pub fn sent(&self) -> Vec<MailInfo> {
        self.log.lock().map(|log| log.sent.clone()).unwrap_or_default()
    }

    /// Every message handed to the dispatcher, accepted or not.
    #[must_use]
    pub fn attempts(&self) -> Vec<MailInfo> {
        self.log
            .lock()
            .map(|log| log.attempts.clone())
            .unwrap_or_default()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn send(&self, message: &MailInfo) -> impl Future<Output = Result<(), NotificationError>> + Send {
        let log = Arc::clone(&self.log);
        let message = message.clone();

        async move {
            let mut log = log
                .lock()
                .map_err(|_| NotificationError::Transport("recording lock poisoned".to_string()))?;
            log.attempts.push(message.clone());
            if let Some(error) = log.failures.get(&message.recipient) {
                return Err(error.clone());
            }
            log.sent.push(message);
            Ok(())
        }
    }
}
