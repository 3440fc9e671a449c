//! Recruit board environment.
//!
//! Every collaborator the reducers reach is injected here, so tests swap in
//! the in-memory fakes and production wires the `PostgreSQL` stores and SMTP.

use crate::config::{BoardConfig, MailConfig};
use crate::providers::{Directory, NotificationDispatcher, RecruitStore, SequenceGenerator};
use guildhack_core::environment::Clock;
use std::sync::Arc;

/// Recruit board environment.
///
/// # Type Parameters
///
/// - `Q`: Sequence generator
/// - `R`: Recruit store
/// - `D`: Directory
/// - `N`: Notification dispatcher
#[derive(Clone)]
pub struct RecruitEnvironment<Q, R, D, N>
where
    Q: SequenceGenerator + Clone,
    R: RecruitStore + Clone,
    D: Directory + Clone,
    N: NotificationDispatcher + Clone,
{
    /// Identifier counters.
    pub sequences: Q,

    /// Recruit persistence.
    pub recruits: R,

    /// Lookups for notice rendering.
    pub directory: D,

    /// Mail transport.
    pub notifier: N,

    /// Time source for `created`/`updated`.
    pub clock: Arc<dyn Clock>,

    /// Board settings.
    pub board: BoardConfig,

    /// Mail identity.
    pub mail: MailConfig,
}

impl<Q, R, D, N> RecruitEnvironment<Q, R, D, N>
where
    Q: SequenceGenerator + Clone,
    R: RecruitStore + Clone,
    D: Directory + Clone,
    N: NotificationDispatcher + Clone,
{
    /// Create a new environment.
    #[must_use]
    pub fn new(
        sequences: Q,
        recruits: R,
        directory: D,
        notifier: N,
        clock: Arc<dyn Clock>,
        board: BoardConfig,
        mail: MailConfig,
    ) -> Self {
        Self {
            sequences,
            recruits,
            directory,
            notifier,
            clock,
            board,
            mail,
        }
    }
}
