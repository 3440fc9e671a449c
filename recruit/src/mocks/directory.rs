//! In-memory directory.

use crate::error::{RecruitError, Result};
use crate::mocks::InMemoryRecruitStore;
use crate::providers::Directory;
use crate::state::{Contact, RecruitId, RecruitSummary, User, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Directory reading recruits from an [`InMemoryRecruitStore`] and users
/// from its own map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    recruits: InMemoryRecruitStore,
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryDirectory {
    /// Create a directory over a store.
    #[must_use]
    pub fn new(recruits: InMemoryRecruitStore) -> Self {
        Self {
            recruits,
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::Internal`] if the user map lock is poisoned.
    pub fn add_user(&self, user: User) -> Result<()> {
        self.users
            .lock()
            .map_err(|_| RecruitError::Internal("directory lock poisoned".to_string()))?
            .insert(user.uid.clone(), user);
        Ok(())
    }
}

impl Directory for InMemoryDirectory {
    fn get_recruit(&self, id: RecruitId) -> impl Future<Output = Result<RecruitSummary>> + Send {
        let recruit = self.recruits.raw(id);

        async move {
            recruit
                .map(|r| r.summary())
                .ok_or(RecruitError::RecruitNotFound(id))
        }
    }

    fn get_user(&self, uid: &UserId) -> impl Future<Output = Result<Contact>> + Send {
        let users = Arc::clone(&self.users);
        let uid = uid.clone();

        async move {
            users
                .lock()
                .map_err(|_| RecruitError::Internal("directory lock poisoned".to_string()))?
                .get(&uid)
                .map(User::contact)
                .ok_or(RecruitError::UserNotFound(uid))
        }
    }
}
