//! Directory trait.

use crate::error::Result;
use crate::state::{Contact, RecruitId, RecruitSummary, UserId};

/// Read-only lookups used to address and fill in notices.
///
/// Lookups are not filtered on `isActive`; a board hidden after a join still
/// produces its notices.
pub trait Directory: Send + Sync {
    /// Recruit projection by identifier.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::RecruitNotFound`](crate::RecruitError::RecruitNotFound) if absent
    /// - [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable) on storage failure
    fn get_recruit(
        &self,
        id: RecruitId,
    ) -> impl std::future::Future<Output = Result<RecruitSummary>> + Send;

    /// User projection by identifier.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::UserNotFound`](crate::RecruitError::UserNotFound) if absent
    /// - [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable) on storage failure
    fn get_user(&self, uid: &UserId) -> impl std::future::Future<Output = Result<Contact>> + Send;
}
