//! Recruit board actions.
//!
//! Commands come from callers; every other variant is reported back by an
//! effect and carries the correlation id of the command that started it.

use crate::error::RecruitError;
use crate::state::{JoinReport, JoinRequest, Member, NoticeOutcome, Recruit, RecruitDraft, RecruitId};
use uuid::Uuid;

/// Recruit board action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecruitAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Creation
    // ═══════════════════════════════════════════════════════════════════════
    /// Post a new board.
    CreateRecruit {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Board as received.
        draft: RecruitDraft,
    },

    /// The board was stored.
    RecruitCreated {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Stored record.
        recruit: Recruit,
    },

    /// Nothing was stored.
    RecruitCreationFailed {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Why.
        error: RecruitError,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Membership join
    // ═══════════════════════════════════════════════════════════════════════
    /// Join a board.
    ///
    /// # Flow
    ///
    /// 1. Validate `uid` and `position`
    /// 2. Append the member
    /// 3. Notify the organizer (best effort)
    /// 4. Notify the joiner (best effort)
    JoinRecruit {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Board to join.
        recruit_id: RecruitId,
        /// Join body as received.
        request: JoinRequest,
    },

    /// The member is on the roster.
    MemberAppended {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Board joined.
        recruit_id: RecruitId,
        /// Appended entry.
        member: Member,
        /// Roster size after the append.
        roster_size: usize,
    },

    /// The organizer notice was attempted.
    OrganizerNotified {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// What happened.
        outcome: NoticeOutcome,
    },

    /// The joiner notice was attempted.
    MemberNotified {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// What happened.
        outcome: NoticeOutcome,
    },

    /// The join finished; the member stays on the roster whatever the notices did.
    JoinCompleted {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Summary for the caller.
        report: JoinReport,
    },

    /// The join stopped before the roster changed.
    JoinAborted {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
        /// Board the join targeted.
        recruit_id: RecruitId,
        /// Why.
        error: RecruitError,
    },
}

impl RecruitAction {
    /// Correlation id carried by every variant.
    #[must_use]
    pub const fn correlation_id(&self) -> Uuid {
        match self {
            Self::CreateRecruit { correlation_id, .. }
            | Self::RecruitCreated { correlation_id, .. }
            | Self::RecruitCreationFailed { correlation_id, .. }
            | Self::JoinRecruit { correlation_id, .. }
            | Self::MemberAppended { correlation_id, .. }
            | Self::OrganizerNotified { correlation_id, .. }
            | Self::MemberNotified { correlation_id, .. }
            | Self::JoinCompleted { correlation_id, .. }
            | Self::JoinAborted { correlation_id, .. } => *correlation_id,
        }
    }

    /// Whether this action ends a request.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::RecruitCreated { .. }
                | Self::RecruitCreationFailed { .. }
                | Self::JoinCompleted { .. }
                | Self::JoinAborted { .. }
        )
    }

    /// Whether this action belongs to the creation flow.
    #[must_use]
    pub const fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::CreateRecruit { .. }
                | Self::RecruitCreated { .. }
                | Self::RecruitCreationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_actions_end_requests() {
        let id = Uuid::new_v4();
        let aborted = RecruitAction::JoinAborted {
            correlation_id: id,
            recruit_id: RecruitId(1),
            error: RecruitError::RecruitNotFound(RecruitId(1)),
        };
        assert!(aborted.is_terminal());
        assert!(!aborted.is_creation());
        assert_eq!(aborted.correlation_id(), id);

        let notified = RecruitAction::OrganizerNotified {
            correlation_id: id,
            outcome: NoticeOutcome::Sent,
        };
        assert!(!notified.is_terminal());
    }
}
