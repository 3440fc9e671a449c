//! Request-level entry point.
//!
//! [`RecruitBoard`] is what a transport layer calls. Reads go straight to the
//! recruit store; creations and joins are sent through the store runtime and
//! awaited on their correlation id.

use crate::actions::RecruitAction;
use crate::environment::RecruitEnvironment;
use crate::error::{RecruitError, Result};
use crate::providers::{Directory, NotificationDispatcher, RecruitStore, SequenceGenerator};
use crate::reducers::RecruitReducer;
use crate::state::{JoinReport, JoinRequest, Recruit, RecruitDraft, RecruitId, RecruitState, UserId};
use guildhack_runtime::Store;
use std::time::Duration;
use uuid::Uuid;

type BoardStore<Q, R, D, N> =
    Store<RecruitState, RecruitAction, RecruitEnvironment<Q, R, D, N>, RecruitReducer<Q, R, D, N>>;

/// Recruit board service.
pub struct RecruitBoard<Q, R, D, N>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
    N: NotificationDispatcher + Clone + 'static,
{
    store: BoardStore<Q, R, D, N>,
    recruits: R,
    request_timeout: Duration,
}

impl<Q, R, D, N> Clone for RecruitBoard<Q, R, D, N>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
    N: NotificationDispatcher + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            recruits: self.recruits.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<Q, R, D, N> RecruitBoard<Q, R, D, N>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
    N: NotificationDispatcher + Clone + 'static,
{
    /// Start a board over an environment.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(environment: RecruitEnvironment<Q, R, D, N>, request_timeout: Duration) -> Self {
        let recruits = environment.recruits.clone();
        let store = Store::new(RecruitState::default(), RecruitReducer::new(), environment);

        Self {
            store,
            recruits,
            request_timeout,
        }
    }

    /// Active recruits, highest identifier first.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`] on storage failure.
    pub async fn list_active(&self) -> Result<Vec<Recruit>> {
        let recruits = self.recruits.list_active().await?;
        tracing::debug!(count = recruits.len(), "Listed active recruits");
        Ok(recruits)
    }

    /// One active recruit.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::RecruitNotFound`] if absent or inactive
    /// - [`RecruitError::StorageUnavailable`] on storage failure
    pub async fn get(&self, id: RecruitId) -> Result<Recruit> {
        tracing::debug!(recruit_id = %id, "Fetching recruit");
        self.recruits.get_by_id(id).await
    }

    /// Active recruits created by a user.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`] on storage failure.
    pub async fn posted_by(&self, uid: &UserId) -> Result<Vec<Recruit>> {
        tracing::debug!(uid = %uid, "Listing posted recruits");
        self.recruits.list_posted_by(uid).await
    }

    /// Active recruits a user has joined.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`] on storage failure.
    pub async fn joined_by(&self, uid: &UserId) -> Result<Vec<Recruit>> {
        tracing::debug!(uid = %uid, "Listing joined recruits");
        self.recruits.list_joined_by(uid).await
    }

    /// Post a new board.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::InvalidRequest`] if `masterId`, `title` or `position` is missing
    /// - [`RecruitError::StorageUnavailable`] if the counter or the store failed
    /// - [`RecruitError::Runtime`] if the request timed out or the board is shutting down
    pub async fn create(&self, draft: RecruitDraft) -> Result<Recruit> {
        let correlation_id = Uuid::new_v4();

        match self
            .request(RecruitAction::CreateRecruit {
                correlation_id,
                draft,
            })
            .await?
        {
            RecruitAction::RecruitCreated { recruit, .. } => Ok(recruit),
            RecruitAction::RecruitCreationFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Join a board.
    ///
    /// Succeeds once the member is appended, whatever happened to the notices;
    /// their outcomes are in the returned [`JoinReport`].
    ///
    /// # Errors
    ///
    /// - [`RecruitError::InvalidRequest`] if `uid` or `position` is missing
    /// - [`RecruitError::RecruitNotFound`] if the recruit does not exist
    /// - [`RecruitError::StorageUnavailable`] if the append failed
    /// - [`RecruitError::Runtime`] if the request timed out or the board is shutting down
    pub async fn join(&self, recruit_id: RecruitId, request: JoinRequest) -> Result<JoinReport> {
        let correlation_id = Uuid::new_v4();

        match self
            .request(RecruitAction::JoinRecruit {
                correlation_id,
                recruit_id,
                request,
            })
            .await?
        {
            RecruitAction::JoinCompleted { report, .. } => Ok(report),
            RecruitAction::JoinAborted { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Joins still running in this process.
    pub async fn joins_in_flight(&self) -> usize {
        self.store.state(RecruitState::joins_in_flight).await
    }

    /// Creations still running in this process.
    pub async fn creations_in_flight(&self) -> usize {
        self.store.state(RecruitState::creations_in_flight).await
    }

    /// Stop accepting requests and wait for running workflows.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::Runtime`] if workflows were still running at the timeout.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    async fn request(&self, action: RecruitAction) -> Result<RecruitAction> {
        let correlation_id = action.correlation_id();

        let outcome = self
            .store
            .send_and_wait_for(
                action,
                move |a| a.is_terminal() && a.correlation_id() == correlation_id,
                self.request_timeout,
            )
            .await;

        outcome.map_err(|error| {
            tracing::error!(correlation_id = %correlation_id, error = %error, "Request did not finish");
            RecruitError::from(error)
        })
    }
}

fn unexpected(action: &RecruitAction) -> RecruitError {
    RecruitError::Internal(format!("unexpected terminal action {action:?}"))
}
