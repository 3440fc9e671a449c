//! Sequence generator trait.

use crate::error::Result;

/// Issues increasing identifiers from named counters.
///
/// Implementations must increment with a single atomic operation at the
/// storage layer. Concurrent callers on the same name never see the same
/// value and no increment is lost.
pub trait SequenceGenerator: Send + Sync {
    /// Increment the named counter by one and return the new value.
    ///
    /// A counter that does not exist yet starts from zero, so the first call
    /// returns `1`.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`](crate::RecruitError::StorageUnavailable)
    /// if the increment could not be performed.
    fn next_value(&self, sequence: &str) -> impl std::future::Future<Output = Result<i64>> + Send;
}
