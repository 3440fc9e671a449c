//! Membership join reducer.
//!
//! # Flow
//!
//! 1. `JoinRecruit`: validate `uid`/`position`, then append the member
//! 2. `MemberAppended`: render and send the organizer notice
//! 3. `OrganizerNotified`: render and send the joiner notice
//! 4. `MemberNotified`: report completion
//!
//! A join stops (`Aborted`) only before the roster changes. Once the member is
//! appended, a failed or abandoned notice is logged and the next step runs.

use crate::actions::RecruitAction;
use crate::config::{BoardConfig, MailConfig};
use crate::environment::RecruitEnvironment;
use crate::error::RecruitError;
use crate::notice::{NoticeData, NoticeKind, render_notice};
use crate::providers::{Directory, NotificationDispatcher, RecruitStore, SequenceGenerator};
use crate::reducers::report;
use crate::state::{JoinPhase, JoinProgress, JoinReport, Member, NoticeOutcome, RecruitId, RecruitState};
use crate::utils::format_board_timestamp;
use guildhack_core::effect::Effect;
use guildhack_core::reducer::Reducer;
use guildhack_core::{SmallVec, smallvec};
use std::marker::PhantomData;
use uuid::Uuid;

/// Membership join reducer.
pub struct JoinReducer<Q, R, D, N> {
    _phantom: PhantomData<(Q, R, D, N)>,
}

impl<Q, R, D, N> JoinReducer<Q, R, D, N> {
    /// Create a new join reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<Q, R, D, N> Default for JoinReducer<Q, R, D, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q, R, D, N> Clone for JoinReducer<Q, R, D, N> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Q, R, D, N> std::fmt::Debug for JoinReducer<Q, R, D, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JoinReducer")
    }
}

/// Resolve recipient data, render one notice and hand it to the transport.
async fn deliver<D, N>(
    directory: &D,
    notifier: &N,
    board: &BoardConfig,
    mail: &MailConfig,
    kind: NoticeKind,
    recruit_id: RecruitId,
    member: &Member,
) -> NoticeOutcome
where
    D: Directory,
    N: NotificationDispatcher,
{
    let recruit = match directory.get_recruit(recruit_id).await {
        Ok(recruit) => recruit,
        Err(error) => return NoticeOutcome::Abandoned(error),
    };

    let recipient_id = match kind {
        NoticeKind::Organizer => &recruit.master_id,
        NoticeKind::Joiner => &member.uid,
    };
    let recipient = match directory.get_user(recipient_id).await {
        Ok(contact) => contact,
        Err(error) => return NoticeOutcome::Abandoned(error),
    };

    let message = render_notice(
        kind,
        &NoticeData {
            recruit: &recruit,
            recipient: &recipient,
            position: &member.position,
        },
        board,
        mail,
    );

    match notifier.send(&message).await {
        Ok(()) => NoticeOutcome::Sent,
        Err(error) => NoticeOutcome::Failed(error),
    }
}

fn notice_effect<Q, R, D, N>(
    env: &RecruitEnvironment<Q, R, D, N>,
    kind: NoticeKind,
    correlation_id: Uuid,
    recruit_id: RecruitId,
    member: Member,
) -> Effect<RecruitAction>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
    N: NotificationDispatcher + Clone + 'static,
{
    let directory = env.directory.clone();
    let notifier = env.notifier.clone();
    let board = env.board.clone();
    let mail = env.mail.clone();

    Effect::future(async move {
        let outcome = deliver(&directory, &notifier, &board, &mail, kind, recruit_id, &member).await;
        Some(match kind {
            NoticeKind::Organizer => RecruitAction::OrganizerNotified {
                correlation_id,
                outcome,
            },
            NoticeKind::Joiner => RecruitAction::MemberNotified {
                correlation_id,
                outcome,
            },
        })
    })
}

fn log_outcome(kind: NoticeKind, correlation_id: Uuid, recruit_id: RecruitId, outcome: &NoticeOutcome) {
    match outcome {
        NoticeOutcome::Sent => {
            tracing::info!(
                correlation_id = %correlation_id,
                recruit_id = %recruit_id,
                notice = kind.as_str(),
                "Notice sent"
            );
            metrics::counter!("recruit.notices.sent", "notice" => kind.as_str()).increment(1);
        },
        NoticeOutcome::Failed(error) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                recruit_id = %recruit_id,
                notice = kind.as_str(),
                category = error.category(),
                error = %error,
                "Notice delivery failed"
            );
            metrics::counter!(
                "recruit.notices.failed",
                "notice" => kind.as_str(),
                "category" => error.category()
            )
            .increment(1);
        },
        NoticeOutcome::Abandoned(error) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                recruit_id = %recruit_id,
                notice = kind.as_str(),
                error = %error,
                "Notice abandoned, recipient data unavailable"
            );
            metrics::counter!("recruit.notices.abandoned", "notice" => kind.as_str()).increment(1);
        },
    }
}

fn log_abort(correlation_id: Uuid, recruit_id: RecruitId, error: &RecruitError) {
    if error.is_user_error() || error.is_not_found() {
        tracing::warn!(
            correlation_id = %correlation_id,
            recruit_id = %recruit_id,
            phase = ?JoinPhase::Aborted,
            error = %error,
            "Join rejected"
        );
    } else {
        tracing::error!(
            correlation_id = %correlation_id,
            recruit_id = %recruit_id,
            phase = ?JoinPhase::Aborted,
            error = %error,
            "Join failed"
        );
    }
}

impl<Q, R, D, N> Reducer for JoinReducer<Q, R, D, N>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
    N: NotificationDispatcher + Clone + 'static,
{
    type State = RecruitState;
    type Action = RecruitAction;
    type Environment = RecruitEnvironment<Q, R, D, N>;

    #[allow(clippy::too_many_lines)] // One arm per workflow transition
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Received: validate, then append
            // ═══════════════════════════════════════════════════════════════
            RecruitAction::JoinRecruit {
                correlation_id,
                recruit_id,
                request,
            } => {
                let member = match request.validate() {
                    Ok(member) => member,
                    Err(error) => {
                        return smallvec![report(RecruitAction::JoinAborted {
                            correlation_id,
                            recruit_id,
                            error,
                        })];
                    },
                };

                tracing::debug!(
                    correlation_id = %correlation_id,
                    recruit_id = %recruit_id,
                    uid = %member.uid,
                    position = %member.position,
                    "Join received"
                );
                state
                    .joins
                    .insert(correlation_id, JoinProgress::received(recruit_id, member.clone()));

                let recruits = env.recruits.clone();
                let updated = format_board_timestamp(env.clock.now(), env.board.utc_offset_hours);

                smallvec![Effect::future(async move {
                    Some(match recruits.append_member(recruit_id, &member, &updated).await {
                        Ok(recruit) => RecruitAction::MemberAppended {
                            correlation_id,
                            recruit_id,
                            roster_size: recruit.members.len(),
                            member,
                        },
                        Err(error) => RecruitAction::JoinAborted {
                            correlation_id,
                            recruit_id,
                            error,
                        },
                    })
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // Appended: organizer notice
            // ═══════════════════════════════════════════════════════════════
            RecruitAction::MemberAppended {
                correlation_id,
                recruit_id,
                member,
                roster_size,
            } => {
                tracing::info!(
                    correlation_id = %correlation_id,
                    recruit_id = %recruit_id,
                    uid = %member.uid,
                    roster_size,
                    "Member appended"
                );

                let Some(progress) = state.joins.get_mut(&correlation_id) else {
                    tracing::warn!(correlation_id = %correlation_id, "MemberAppended for unknown join");
                    return smallvec![Effect::None];
                };
                progress.phase = JoinPhase::Appended;

                smallvec![notice_effect(
                    env,
                    NoticeKind::Organizer,
                    correlation_id,
                    recruit_id,
                    member
                )]
            },

            // ═══════════════════════════════════════════════════════════════
            // Notified(Organizer): joiner notice, whatever the outcome
            // ═══════════════════════════════════════════════════════════════
            RecruitAction::OrganizerNotified {
                correlation_id,
                outcome,
            } => {
                let Some(progress) = state.joins.get_mut(&correlation_id) else {
                    tracing::warn!(correlation_id = %correlation_id, "OrganizerNotified for unknown join");
                    return smallvec![Effect::None];
                };

                log_outcome(NoticeKind::Organizer, correlation_id, progress.recruit_id, &outcome);
                progress.organizer_notice = Some(outcome);
                progress.phase = JoinPhase::NotifiedOrganizer;

                smallvec![notice_effect(
                    env,
                    NoticeKind::Joiner,
                    correlation_id,
                    progress.recruit_id,
                    progress.member.clone()
                )]
            },

            // ═══════════════════════════════════════════════════════════════
            // Notified(Member): report completion
            // ═══════════════════════════════════════════════════════════════
            RecruitAction::MemberNotified {
                correlation_id,
                outcome,
            } => {
                let Some(progress) = state.joins.get_mut(&correlation_id) else {
                    tracing::warn!(correlation_id = %correlation_id, "MemberNotified for unknown join");
                    return smallvec![Effect::None];
                };

                log_outcome(NoticeKind::Joiner, correlation_id, progress.recruit_id, &outcome);
                progress.phase = JoinPhase::NotifiedMember;

                let Some(organizer_notice) = progress.organizer_notice.clone() else {
                    tracing::warn!(correlation_id = %correlation_id, "MemberNotified before OrganizerNotified");
                    return smallvec![Effect::None];
                };

                smallvec![report(RecruitAction::JoinCompleted {
                    correlation_id,
                    report: JoinReport {
                        recruit_id: progress.recruit_id,
                        member: progress.member.clone(),
                        organizer_notice,
                        member_notice: outcome,
                    },
                })]
            },

            RecruitAction::JoinCompleted {
                correlation_id,
                report,
            } => {
                state.joins.remove(&correlation_id);

                tracing::info!(
                    correlation_id = %correlation_id,
                    recruit_id = %report.recruit_id,
                    uid = %report.member.uid,
                    phase = ?JoinPhase::Complete,
                    organizer_notice_sent = report.organizer_notice.is_sent(),
                    member_notice_sent = report.member_notice.is_sent(),
                    "Join complete"
                );
                metrics::counter!("recruit.joins.completed").increment(1);

                smallvec![Effect::None]
            },

            RecruitAction::JoinAborted {
                correlation_id,
                recruit_id,
                error,
            } => {
                state.joins.remove(&correlation_id);
                log_abort(correlation_id, recruit_id, &error);
                metrics::counter!("recruit.joins.aborted").increment(1);

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
    use crate::error::NotificationError;
    use crate::reducers::test_support::{Fixture, TestJoinReducer, drive};
    use crate::state::JoinRequest;
    use guildhack_testing::{ReducerTest, assertions};

    fn join(correlation_id: Uuid, recruit_id: i64, uid: &str, position: &str) -> RecruitAction {
        RecruitAction::JoinRecruit {
            correlation_id,
            recruit_id: RecruitId(recruit_id),
            request: JoinRequest::new(uid, position),
        }
    }

    #[test]
    fn valid_join_is_received_and_appends() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();

        ReducerTest::new(TestJoinReducer::new())
            .with_env(fixture.env.clone())
            .given_state(RecruitState::default())
            .when_action(join(correlation_id, 1, "u2", "frontend"))
            .then_state(move |state| {
                let progress = &state.joins[&correlation_id];
                assert_eq!(progress.phase, JoinPhase::Received);
                assert_eq!(progress.member, Member::new("u2", "frontend"));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn appended_join_moves_on_to_the_organizer() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let member = Member::new("u2", "infra");
        let mut state = RecruitState::default();
        state
            .joins
            .insert(correlation_id, JoinProgress::received(RecruitId(1), member.clone()));

        ReducerTest::new(TestJoinReducer::new())
            .with_env(fixture.env)
            .given_state(state)
            .when_action(RecruitAction::MemberAppended {
                correlation_id,
                recruit_id: RecruitId(1),
                member,
                roster_size: 2,
            })
            .then_state(move |state| {
                assert_eq!(state.joins[&correlation_id].phase, JoinPhase::Appended);
                assert_eq!(state.joins_in_flight(), 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn finished_joins_release_their_state() {
        let fixture = Fixture::new();
        let mut state = RecruitState::default();

        for n in 0..50 {
            drive(&mut state, &fixture.env, join(Uuid::new_v4(), 1, "u2", "backend")).await;
            drive(&mut state, &fixture.env, join(Uuid::new_v4(), 99, "u2", "backend")).await;
            drive(&mut state, &fixture.env, join(Uuid::new_v4(), 1, &format!("x{n}"), "")).await;
        }

        assert!(state.joins.is_empty());
        assert_eq!(state.joins_in_flight(), 0);
        assert_eq!(fixture.recruits.raw(RecruitId(1)).unwrap().members.len(), 51);
    }

    #[tokio::test]
    async fn join_walks_every_phase() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(&mut state, &fixture.env, join(correlation_id, 1, "u2", "frontend")).await;

        let names: Vec<_> = seen
            .iter()
            .map(|a| match a {
                RecruitAction::JoinRecruit { .. } => "join",
                RecruitAction::MemberAppended { .. } => "appended",
                RecruitAction::OrganizerNotified { .. } => "organizer",
                RecruitAction::MemberNotified { .. } => "member",
                RecruitAction::JoinCompleted { .. } => "complete",
                _ => "other",
            })
            .collect();
        assert_eq!(names, vec!["join", "appended", "organizer", "member", "complete"]);

        let Some(RecruitAction::JoinCompleted { report, .. }) = seen.last() else {
            panic!("join did not complete: {seen:?}");
        };
        assert_eq!(report.organizer_notice, NoticeOutcome::Sent);
        assert_eq!(report.member_notice, NoticeOutcome::Sent);
        assert!(state.joins.is_empty());

        let sent = fixture.dispatcher.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].recipient, "master@example.com");
        assert!(sent[0].text_body.contains("フロントエンドで1人目"));
        assert_eq!(sent[1].recipient, "joiner@example.com");

        let stored = fixture.recruits.raw(RecruitId(1)).unwrap();
        assert_eq!(stored.members.len(), 2);
        assert_eq!(stored.updated, "2025-01-01 09:00");
    }

    #[tokio::test]
    async fn missing_position_aborts_without_side_effects() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(&mut state, &fixture.env, join(correlation_id, 1, "u2", " ")).await;

        assert!(matches!(
            seen.last(),
            Some(RecruitAction::JoinAborted { error: RecruitError::InvalidRequest { .. }, .. })
        ));
        assert!(state.joins.is_empty());
        assert_eq!(fixture.recruits.raw(RecruitId(1)).unwrap().members.len(), 1);
        assert!(fixture.dispatcher.attempts().is_empty());
    }

    #[tokio::test]
    async fn unknown_recruit_aborts_before_notifying() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(&mut state, &fixture.env, join(correlation_id, 99, "u2", "infra")).await;

        assert!(matches!(
            seen.last(),
            Some(RecruitAction::JoinAborted { error: RecruitError::RecruitNotFound(RecruitId(99)), .. })
        ));
        assert_eq!(seen.len(), 2);
        assert!(state.joins.is_empty());
        assert!(fixture.dispatcher.attempts().is_empty());
    }

    #[tokio::test]
    async fn organizer_failure_still_notifies_joiner() {
        let fixture = Fixture::new();
        fixture.dispatcher.fail_for(
            "master@example.com",
            NotificationError::MessageRejected("550 mailbox unavailable".into()),
        );
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(&mut state, &fixture.env, join(correlation_id, 1, "u2", "backend")).await;

        let Some(RecruitAction::JoinCompleted { report, .. }) = seen.last() else {
            panic!("join did not complete: {seen:?}");
        };
        assert!(matches!(report.organizer_notice, NoticeOutcome::Failed(_)));
        assert_eq!(report.member_notice, NoticeOutcome::Sent);
        assert_eq!(fixture.dispatcher.attempts().len(), 2);
        assert_eq!(fixture.recruits.raw(RecruitId(1)).unwrap().members.len(), 2);
    }

    #[tokio::test]
    async fn unknown_joiner_abandons_only_the_joiner_notice() {
        let fixture = Fixture::new();
        let correlation_id = Uuid::new_v4();
        let mut state = RecruitState::default();

        let seen = drive(&mut state, &fixture.env, join(correlation_id, 1, "ghost", "infra")).await;

        let Some(RecruitAction::JoinCompleted { report, .. }) = seen.last() else {
            panic!("join did not complete: {seen:?}");
        };
        assert_eq!(report.organizer_notice, NoticeOutcome::Sent);
        assert_eq!(
            report.member_notice,
            NoticeOutcome::Abandoned(RecruitError::UserNotFound("ghost".into()))
        );
        assert!(fixture.recruits.raw(RecruitId(1)).unwrap().has_member(&"ghost".into()));
    }

    #[test]
    fn stray_notice_for_unknown_join_is_ignored() {
        let fixture = Fixture::new();

        ReducerTest::new(TestJoinReducer::new())
            .with_env(fixture.env)
            .given_state(RecruitState::default())
            .when_action(RecruitAction::OrganizerNotified {
                correlation_id: Uuid::new_v4(),
                outcome: NoticeOutcome::Sent,
            })
            .then_state(|state| assert!(state.joins.is_empty()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert!(effects[0].is_none());
            })
            .run();
    }
}
