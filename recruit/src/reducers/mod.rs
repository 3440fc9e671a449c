//! Recruit board reducers.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//! Storage, directory lookups and mail all happen inside returned effects.

pub mod create;
pub mod join;

use crate::actions::RecruitAction;
use crate::environment::RecruitEnvironment;
use crate::providers::{Directory, NotificationDispatcher, RecruitStore, SequenceGenerator};
use crate::state::RecruitState;
use guildhack_core::{SmallVec, effect::Effect, reducer::Reducer};

pub use create::CreationReducer;
pub use join::JoinReducer;

/// Report an action back to the store without doing any work.
///
/// Callers waiting on a correlation id only see effect-produced actions,
/// so outcomes decided synchronously still travel through an effect.
pub(crate) fn report(action: RecruitAction) -> Effect<RecruitAction> {
    Effect::future(std::future::ready(Some(action)))
}

/// Unified recruit board reducer.
///
/// Routes creation actions to [`CreationReducer`] and everything else to
/// [`JoinReducer`].
pub struct RecruitReducer<Q, R, D, N> {
    create: CreationReducer<Q, R, D, N>,
    join: JoinReducer<Q, R, D, N>,
}

impl<Q, R, D, N> RecruitReducer<Q, R, D, N> {
    /// Create a new unified reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            create: CreationReducer::new(),
            join: JoinReducer::new(),
        }
    }
}

impl<Q, R, D, N> Default for RecruitReducer<Q, R, D, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q, R, D, N> Clone for RecruitReducer<Q, R, D, N> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Q, R, D, N> std::fmt::Debug for RecruitReducer<Q, R, D, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecruitReducer")
            .field("create", &self.create)
            .field("join", &self.join)
            .finish()
    }
}

impl<Q, R, D, N> Reducer for RecruitReducer<Q, R, D, N>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
    N: NotificationDispatcher + Clone + 'static,
{
    type State = RecruitState;
    type Action = RecruitAction;
    type Environment = RecruitEnvironment<Q, R, D, N>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.is_creation() {
            self.create.reduce(state, action, env)
        } else {
            self.join.reduce(state, action, env)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{BoardConfig, MailConfig};
    use crate::mocks::{
        InMemoryDirectory, InMemoryRecruitStore, InMemorySequenceGenerator, RecordingDispatcher,
    };
    use crate::providers::create_recruit;
    use crate::state::{RecruitDraft, User, UserId};
    use guildhack_core::environment::Clock;
    use guildhack_testing::{resolve_effect, test_clock};
    use std::sync::Arc;

    pub type TestEnvironment = RecruitEnvironment<
        InMemorySequenceGenerator,
        InMemoryRecruitStore,
        InMemoryDirectory,
        RecordingDispatcher,
    >;
    pub type TestRecruitReducer = RecruitReducer<
        InMemorySequenceGenerator,
        InMemoryRecruitStore,
        InMemoryDirectory,
        RecordingDispatcher,
    >;
    pub type TestJoinReducer = JoinReducer<
        InMemorySequenceGenerator,
        InMemoryRecruitStore,
        InMemoryDirectory,
        RecordingDispatcher,
    >;
    pub type TestCreationReducer = CreationReducer<
        InMemorySequenceGenerator,
        InMemoryRecruitStore,
        InMemoryDirectory,
        RecordingDispatcher,
    >;

    /// In-memory environment holding recruit 1 (`u1`, backend) and users
    /// `u1` (master) and `u2` (joiner).
    pub struct Fixture {
        pub env: TestEnvironment,
        pub sequences: InMemorySequenceGenerator,
        pub recruits: InMemoryRecruitStore,
        pub dispatcher: RecordingDispatcher,
    }

    impl Fixture {
        pub fn new() -> Self {
            let sequences = InMemorySequenceGenerator::new();
            let recruits = InMemoryRecruitStore::new();
            let directory = InMemoryDirectory::new(recruits.clone());
            let dispatcher = RecordingDispatcher::new();

            for (uid, name, email) in [
                ("u1", "Master", "master@example.com"),
                ("u2", "Joiner", "joiner@example.com"),
            ] {
                directory
                    .add_user(User {
                        uid: UserId::from(uid),
                        name: name.to_string(),
                        email: email.to_string(),
                        is_login: true,
                        is_active: true,
                    })
                    .unwrap();
            }

            let env = RecruitEnvironment::new(
                sequences.clone(),
                recruits.clone(),
                directory,
                dispatcher.clone(),
                Arc::new(test_clock()),
                BoardConfig::default(),
                MailConfig::default(),
            );

            let new = RecruitDraft {
                master_id: Some("u1".into()),
                title: Some("Spring Hack".into()),
                position: Some("backend".into()),
                ..RecruitDraft::default()
            }
            .validate()
            .unwrap();
            futures::executor::block_on(create_recruit(
                &sequences,
                &recruits,
                &env.board,
                test_clock().now(),
                new,
            ))
            .unwrap();

            Self {
                env,
                sequences,
                recruits,
                dispatcher,
            }
        }
    }

    /// Reduce an action and every action its effects report, depth first,
    /// returning them in the order they were reduced.
    pub async fn drive(
        state: &mut RecruitState,
        env: &TestEnvironment,
        action: RecruitAction,
    ) -> Vec<RecruitAction> {
        let reducer = TestRecruitReducer::new();
        let mut pending = vec![action];
        let mut seen = Vec::new();

        while let Some(action) = pending.pop() {
            seen.push(action.clone());
            let mut produced = Vec::new();
            for effect in reducer.reduce(state, action, env) {
                produced.extend(resolve_effect(effect).await);
            }
            pending.extend(produced.into_iter().rev());
        }
        seen
    }
}
