//! Recruit creation reducer.
//!
//! The draft is validated here; numbering, stamping and storing happen in
//! [`create_recruit`] inside one effect, so a failed counter never reaches
//! the store.

use crate::actions::RecruitAction;
use crate::environment::RecruitEnvironment;
use crate::providers::{Directory, NotificationDispatcher, RecruitStore, SequenceGenerator, create_recruit};
use crate::reducers::report;
use crate::state::RecruitState;
use guildhack_core::effect::Effect;
use guildhack_core::reducer::Reducer;
use guildhack_core::{SmallVec, smallvec};
use std::marker::PhantomData;

/// Recruit creation reducer.
pub struct CreationReducer<Q, R, D, N> {
    _phantom: PhantomData<(Q, R, D, N)>,
}

impl<Q, R, D, N> CreationReducer<Q, R, D, N> {
    /// Create a new creation reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<Q, R, D, N> Default for CreationReducer<Q, R, D, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q, R, D, N> Clone for CreationReducer<Q, R, D, N> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Q, R, D, N> std::fmt::Debug for CreationReducer<Q, R, D, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CreationReducer")
    }
}

impl<Q, R, D, N> Reducer for CreationReducer<Q, R, D, N>
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
        match action {
            RecruitAction::CreateRecruit {
                correlation_id,
                draft,
            } => {
                let new = match draft.validate() {
                    Ok(new) => new,
                    Err(error) => {
                        return smallvec![report(RecruitAction::RecruitCreationFailed {
                            correlation_id,
                            error,
                        })];
                    },
                };

                state.creations.insert(correlation_id);

                let sequences = env.sequences.clone();
                let recruits = env.recruits.clone();
                let board = env.board.clone();
                let now = env.clock.now();

                smallvec![Effect::future(async move {
                    Some(match create_recruit(&sequences, &recruits, &board, now, new).await {
                        Ok(recruit) => RecruitAction::RecruitCreated {
                            correlation_id,
                            recruit,
                        },
                        Err(error) => RecruitAction::RecruitCreationFailed {
                            correlation_id,
                            error,
                        },
                    })
                })]
            },

            RecruitAction::RecruitCreated {
                correlation_id,
                recruit,
            } => {
                state.creations.remove(&correlation_id);
                metrics::counter!("recruit.creations.completed").increment(1);
                smallvec![Effect::None]
            },

            RecruitAction::RecruitCreationFailed {
                correlation_id,
                error,
            } => {
                if error.is_user_error() {
                    tracing::warn!(correlation_id = %correlation_id, error = %error, "Recruit rejected");
                } else {
                    tracing::error!(correlation_id = %correlation_id, error = %error, "Recruit creation failed");
                }
                metrics::counter!("recruit.creations.failed").increment(1);

                state.creations.remove(&correlation_id);
                smallvec![Effect::None]
            },

            _ => smallvec![Effect::None],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::RecruitError;
    use crate::reducers::test_support::{Fixture, TestCreationReducer, drive};
    use crate::state::{Member, RecruitDraft, RecruitId};
    use guildhack_testing::{ReducerTest, assertions};
    use uuid::Uuid;

    fn draft(master: &str, title: &str, position: &str) -> RecruitDraft {
        RecruitDraft {
            master_id: Some(master.into()),
            title: Some(title.into()),
            position: Some(position.into()),
            ..RecruitDraft::default()
        }
    }

    #[test]
    fn valid_draft_is_pending() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();

        ReducerTest::new(TestCreationReducer::new())
            .with_env(fixture.env)
            .given_state(RecruitState::default())
            .when_action(RecruitAction::CreateRecruit {
                correlation_id,
                draft: draft("u1", "Autumn Jam", "infra"),
            })
            .then_state(move |state| {
                assert!(state.creations.contains(&correlation_id));
                assert_eq!(state.creations_in_flight(), 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn creation_numbers_stamps_and_enrolls() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(
            &mut state,
            &fixture.env,
            RecruitAction::CreateRecruit {
                correlation_id,
                draft: draft("u2", "Autumn Jam", "design"),
            },
        )
        .await;

        let Some(RecruitAction::RecruitCreated { recruit, .. }) = seen.last() else {
            panic!("recruit not created: {seen:?}");
        };
        // The fixture already holds recruit 1.
        assert_eq!(recruit.id, RecruitId(2));
        assert_eq!(recruit.members, vec![Member::new("u2", "design")]);
        assert_eq!(recruit.created, "2025-01-01 09:00");
        assert!(state.creations.is_empty());
        assert!(fixture.recruits.raw(RecruitId(2)).is_some());
    }

    #[tokio::test]
    async fn missing_title_stores_nothing() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(
            &mut state,
            &fixture.env,
            RecruitAction::CreateRecruit {
                correlation_id,
                draft: draft("u2", "", "backend"),
            },
        )
        .await;

        let Some(RecruitAction::RecruitCreationFailed { error, .. }) = seen.last() else {
            panic!("creation did not fail: {seen:?}");
        };
        assert_eq!(*error, RecruitError::invalid("title is required"));
        assert!(state.creations.is_empty());
        assert_eq!(fixture.recruits.len(), 1);
        assert_eq!(fixture.sequences.current("Recruits"), 1);
    }

    #[tokio::test]
    async fn counter_outage_stops_before_insert() {
        let fixture = Fixture::new();
        fixture.sequences.set_unavailable(true);
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(
            &mut state,
            &fixture.env,
            RecruitAction::CreateRecruit {
                correlation_id,
                draft: draft("u2", "Autumn Jam", "backend"),
            },
        )
        .await;

        let Some(RecruitAction::RecruitCreationFailed { error, .. }) = seen.last() else {
            panic!("creation did not fail: {seen:?}");
        };
        assert!(error.is_retryable());
        assert!(state.creations.is_empty());
        assert_eq!(fixture.recruits.len(), 1);
    }
}
