//! # GuildHack Testing
//!
//! Testing utilities for reducers and stores.
//!
//! This crate provides:
//! - Deterministic clocks
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use guildhack_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(RecruitReducer::new())
//!     .with_env(environment_with(test_clock()))
//!     .given_state(RecruitState::default())
//!     .when_action(RecruitAction::JoinRecruit { .. })
//!     .then_state(|state| assert_eq!(state.joins.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use guildhack_core::environment::Clock;

pub mod reducer_test;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use guildhack_testing::mocks::FixedClock;
    /// use guildhack_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Create a fixed clock from seconds since the Unix epoch
        ///
        /// Out-of-range values fall back to the epoch itself.
        #[must_use]
        pub fn from_timestamp(secs: i64) -> Self {
            Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::from_timestamp(1_735_689_600)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions, resolve_effect};
