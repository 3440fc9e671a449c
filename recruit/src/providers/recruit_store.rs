//! Recruit store trait and recruit creation.

use crate::config::BoardConfig;
use crate::error::Result;
use crate::providers::SequenceGenerator;
use crate::state::{Member, NewRecruit, Recruit, RecruitId, UserId};
use crate::utils::format_board_timestamp;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Persistence for recruit aggregates.
///
/// Reads only ever return active recruits. Writes never overwrite a roster
/// read earlier: [`append_member`](Self::append_member) is a structural append
/// performed by the storage layer.
pub trait RecruitStore: Send + Sync {
    /// All active recruits, highest identifier first.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable)
    /// on storage failure.
    fn list_active(&self) -> impl Future<Output = Result<Vec<Recruit>>> + Send;

    /// One active recruit.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::RecruitNotFound`](crate::RecruitError::RecruitNotFound) if no
    ///   active recruit has this identifier
    /// - [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable) on storage failure
    fn get_by_id(&self, id: RecruitId) -> impl Future<Output = Result<Recruit>> + Send;

    /// Persist a new recruit.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable)
    /// if the record could not be written.
    fn insert(&self, recruit: &Recruit) -> impl Future<Output = Result<()>> + Send;

    /// Append a member and stamp `updated`, atomically, returning the stored record.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::RecruitNotFound`](crate::RecruitError::RecruitNotFound) if no
    ///   record has this identifier
    /// - [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable) on storage failure
    fn append_member(
        &self,
        id: RecruitId,
        member: &Member,
        updated: &str,
    ) -> impl Future<Output = Result<Recruit>> + Send;

    /// Active recruits created by a user, highest identifier first.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable)
    /// on storage failure.
    fn list_posted_by(&self, master_id: &UserId) -> impl Future<Output = Result<Vec<Recruit>>> + Send;

    /// Active recruits whose roster contains a user, highest identifier first.
    ///
    /// Each recruit appears once even if the user holds several roles on it.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable)
    /// on storage failure.
    fn list_joined_by(&self, uid: &UserId) -> impl Future<Output = Result<Vec<Recruit>>> + Send;
}

/// Create a recruit: issue an identifier, stamp it, enroll the creator, store it.
///
/// Nothing is written when the sequence fails. When the insert fails the
/// issued identifier is skipped, never reused.
///
/// # Errors
///
/// Returns [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable)
/// if either the counter or the store fails.
pub async fn create_recruit<Q, R>(
    sequences: &Q,
    recruits: &R,
    board: &BoardConfig,
    now: DateTime<Utc>,
    new: NewRecruit,
) -> Result<Recruit>
where
    Q: SequenceGenerator,
    R: RecruitStore,
{
    let id = RecruitId(sequences.next_value(&board.sequence_name).await?);
    let recruit = Recruit::open(id, new, format_board_timestamp(now, board.utc_offset_hours));

    recruits.insert(&recruit).await?;

    tracing::info!(
        recruit_id = %recruit.id,
        master_id = %recruit.master_id,
        "Recruit created"
    );
    Ok(recruit)
}
