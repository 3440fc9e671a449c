//! In-memory sequence generator.

use crate::error::{RecruitError, Result};
use crate::providers::SequenceGenerator;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Named counters held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySequenceGenerator {
    counters: Arc<Mutex<HashMap<String, i64>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySequenceGenerator {
    /// Create a generator with no counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter without incrementing it.
    #[must_use]
    pub fn current(&self, sequence: &str) -> i64 {
        self.counters
            .lock()
            .map(|counters| counters.get(sequence).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Make every following call fail with `StorageUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl SequenceGenerator for InMemorySequenceGenerator {
    fn next_value(&self, sequence: &str) -> impl Future<Output = Result<i64>> + Send {
        let counters = Arc::clone(&self.counters);
        let unavailable = self.unavailable.load(Ordering::SeqCst);
        let sequence = sequence.to_string();

        async move {
            if unavailable {
                return Err(RecruitError::StorageUnavailable(format!(
                    "counter {sequence} unavailable"
                )));
            }

            let mut counters = counters
                .lock()
                .map_err(|_| RecruitError::Internal("sequence lock poisoned".to_string()))?;
            let value = counters.entry(sequence).or_insert(0);
            *value += 1;
            Ok(*value)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_are_independent() {
        let sequences = InMemorySequenceGenerator::new();
        assert_eq!(sequences.next_value("Recruits").await.unwrap(), 1);
        assert_eq!(sequences.next_value("Recruits").await.unwrap(), 2);
        assert_eq!(sequences.next_value("Users").await.unwrap(), 1);
        assert_eq!(sequences.current("Recruits"), 2);
    }

    #[tokio::test]
    async fn unavailable_counter_does_not_advance() {
        let sequences = InMemorySequenceGenerator::new();
        sequences.set_unavailable(true);
        let err = sequences.next_value("Recruits").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(sequences.current("Recruits"), 0);
    }
}
