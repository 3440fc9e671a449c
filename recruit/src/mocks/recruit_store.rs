//! In-memory recruit store.

use crate::error::{RecruitError, Result};
use crate::providers::RecruitStore;
use crate::state::{Member, Recruit, RecruitId, UserId};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Records = Arc<Mutex<BTreeMap<RecruitId, Recruit>>>;

/// Recruits held in memory, ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecruitStore {
    records: Records,
    unavailable: Arc<AtomicBool>,
}

fn lock(records: &Records) -> Result<MutexGuard<'_, BTreeMap<RecruitId, Recruit>>> {
    records
        .lock()
        .map_err(|_| RecruitError::Internal("recruit store lock poisoned".to_string()))
}

fn active_desc<F>(records: &BTreeMap<RecruitId, Recruit>, keep: F) -> Vec<Recruit>
where
    F: Fn(&Recruit) -> bool,
{
    records
        .values()
        .rev()
        .filter(|r| r.is_active && keep(r))
        .cloned()
        .collect()
}

impl InMemoryRecruitStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a recruit, as moderation would.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::RecruitNotFound`] if no record has this identifier.
    pub fn deactivate(&self, id: RecruitId) -> Result<()> {
        let mut records = lock(&self.records)?;
        let recruit = records
            .get_mut(&id)
            .ok_or(RecruitError::RecruitNotFound(id))?;
        recruit.is_active = false;
        Ok(())
    }

    /// Stored record regardless of its active flag.
    #[must_use]
    pub fn raw(&self, id: RecruitId) -> Option<Recruit> {
        lock(&self.records).ok()?.get(&id).cloned()
    }

    /// Number of stored records, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.records).map(|r| r.len()).unwrap_or(0)
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every following call fail with `StorageUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RecruitError::StorageUnavailable(
                "recruit store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl RecruitStore for InMemoryRecruitStore {
    fn list_active(&self) -> impl Future<Output = Result<Vec<Recruit>>> + Send {
        let records = Arc::clone(&self.records);
        let available = self.check_available();

        async move {
            available?;
            Ok(active_desc(&*lock(&records)?, |_| true))
        }
    }

    fn get_by_id(&self, id: RecruitId) -> impl Future<Output = Result<Recruit>> + Send {
        let records = Arc::clone(&self.records);
        let available = self.check_available();

        async move {
            available?;
            lock(&records)?
                .get(&id)
                .filter(|r| r.is_active)
                .cloned()
                .ok_or(RecruitError::RecruitNotFound(id))
        }
    }

    fn insert(&self, recruit: &Recruit) -> impl Future<Output = Result<()>> + Send {
        let records = Arc::clone(&self.records);
        let available = self.check_available();
        let recruit = recruit.clone();

        async move {
            available?;
            let mut records = lock(&records)?;
            if records.contains_key(&recruit.id) {
                return Err(RecruitError::StorageUnavailable(format!(
                    "recruit {} already exists",
                    recruit.id
                )));
            }
            records.insert(recruit.id, recruit);
            Ok(())
        }
    }

    fn append_member(
        &self,
        id: RecruitId,
        member: &Member,
        updated: &str,
    ) -> impl Future<Output = Result<Recruit>> + Send {
        let records = Arc::clone(&self.records);
        let available = self.check_available();
        let member = member.clone();
        let updated = updated.to_string();

        async move {
            available?;
            let mut records = lock(&records)?;
            let recruit = records
                .get_mut(&id)
                .ok_or(RecruitError::RecruitNotFound(id))?;
            recruit.members.push(member);
            recruit.updated = updated;
            Ok(recruit.clone())
        }
    }

    fn list_posted_by(&self, master_id: &UserId) -> impl Future<Output = Result<Vec<Recruit>>> + Send {
        let records = Arc::clone(&self.records);
        let available = self.check_available();
        let master_id = master_id.clone();

        async move {
            available?;
            Ok(active_desc(&*lock(&records)?, |r| r.master_id == master_id))
        }
    }

    fn list_joined_by(&self, uid: &UserId) -> impl Future<Output = Result<Vec<Recruit>>> + Send {
        let records = Arc::clone(&self.records);
        let available = self.check_available();
        let uid = uid.clone();

        async move {
            available?;
            Ok(active_desc(&*lock(&records)?, |r| r.has_member(&uid)))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::{NewRecruit, Position, RecruitDetails};

    fn recruit(id: i64, master: &str) -> Recruit {
        Recruit::open(
            RecruitId(id),
            NewRecruit {
                master_id: UserId::from(master),
                title: format!("board {id}"),
                position: Position::Backend,
                details: RecruitDetails::default(),
            },
            "2025-01-01 09:00".to_string(),
        )
    }

    #[tokio::test]
    async fn lists_active_highest_id_first() {
        let store = InMemoryRecruitStore::new();
        for id in [2, 7, 4] {
            store.insert(&recruit(id, "u1")).await.unwrap();
        }
        store.deactivate(RecruitId(4)).unwrap();

        let ids: Vec<_> = store.list_active().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecruitId(7), RecruitId(2)]);
        assert!(store.get_by_id(RecruitId(4)).await.unwrap_err().is_not_found());
        assert!(store.raw(RecruitId(4)).is_some());
    }

    #[tokio::test]
    async fn append_keeps_existing_members() {
        let store = InMemoryRecruitStore::new();
        store.insert(&recruit(1, "u1")).await.unwrap();

        let updated = store
            .append_member(RecruitId(1), &Member::new("u2", "infra"), "2025-01-02 10:00")
            .await
            .unwrap();
        assert_eq!(updated.members.len(), 2);
        assert_eq!(updated.updated, "2025-01-02 10:00");
        assert_eq!(updated.created, "2025-01-01 09:00");
    }

    #[tokio::test]
    async fn append_to_missing_recruit_fails() {
        let store = InMemoryRecruitStore::new();
        let err = store
            .append_member(RecruitId(9), &Member::new("u2", "infra"), "2025-01-02 10:00")
            .await
            .unwrap_err();
        assert_eq!(err, RecruitError::RecruitNotFound(RecruitId(9)));
    }

    #[tokio::test]
    async fn joined_by_lists_each_recruit_once() {
        let store = InMemoryRecruitStore::new();
        store.insert(&recruit(1, "u1")).await.unwrap();
        store.insert(&recruit(2, "u3")).await.unwrap();
        for position in ["frontend", "backend"] {
            store
                .append_member(RecruitId(1), &Member::new("u2", position), "2025-01-02 10:00")
                .await
                .unwrap();
        }

        let joined = store.list_joined_by(&UserId::from("u2")).await.unwrap();
        assert_eq!(joined.len(), 1);
        let posted = store.list_posted_by(&UserId::from("u3")).await.unwrap();
        assert_eq!(posted[0].id, RecruitId(2));
    }
}
