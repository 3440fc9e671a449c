//! Recruit board domain types and join workflow state.

use crate::error::{NotificationError, RecruitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Recruit identifier, issued by the sequence generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecruitId(pub i64);

impl std::fmt::Display for RecruitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a member fills on a board.
///
/// Anything outside the fixed vocabulary is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    /// `frontend`
    Frontend,
    /// `backend`
    Backend,
    /// `infra`
    Infra,
    /// Free text role.
    Other(String),
}

impl Position {
    /// Raw value as stored and sent over the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Infra => "infra",
            Self::Other(raw) => raw,
        }
    }

    /// Label used in notification text.
    ///
    /// ```
    /// # use guildhack_recruit::Position;
    /// assert_eq!(Position::from("backend").label(), "バックエンド");
    /// assert_eq!(Position::from("design").label(), "design");
    /// ```
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Frontend => "フロントエンド",
            Self::Backend => "バックエンド",
            Self::Infra => "インフラ",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Position {
    fn from(value: &str) -> Self {
        match value {
            "frontend" => Self::Frontend,
            "backend" => Self::Backend,
            "infra" => Self::Infra,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Position {
    fn from(value: String) -> Self {
        match value.as_str() {
            "frontend" | "backend" | "infra" => Self::from(value.as_str()),
            _ => Self::Other(value),
        }
    }
}

impl From<Position> for String {
    fn from(value: Position) -> Self {
        match value {
            Position::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (user, role) pair on a recruit roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Joining user.
    pub uid: UserId,
    /// Role taken.
    pub position: Position,
}

impl Member {
    /// Create a roster entry.
    pub fn new(uid: impl Into<UserId>, position: impl Into<Position>) -> Self {
        Self {
            uid: uid.into(),
            position: position.into(),
        }
    }
}

/// Optional descriptive fields shared by drafts and stored recruits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitDetails {
    /// First day of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_day: Option<String>,
    /// Duration in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    /// Event organizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    /// Expected commitment.
    #[serde(default, rename = "commit", skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
    /// Beginner friendliness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beginner: Option<String>,
    /// Free text message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Team chat invite URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_url: Option<String>,
    /// Target member count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_member: Option<String>,
    /// Reward text.
    #[serde(default, rename = "reword", skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
}

/// A posted team-formation board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recruit {
    /// Unique identifier.
    pub id: RecruitId,
    /// Creator of the board.
    pub master_id: UserId,
    /// Board title.
    pub title: String,
    /// Role the creator took.
    pub position: Position,
    /// Descriptive fields.
    #[serde(flatten)]
    pub details: RecruitDetails,
    /// Roster in join order, creator first.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Creation time, `YYYY-MM-DD HH:MM`.
    pub created: String,
    /// Last roster change, `YYYY-MM-DD HH:MM`.
    pub updated: String,
    /// Visibility flag owned by moderation.
    pub is_active: bool,
}

impl Recruit {
    /// Build a freshly created, active recruit with the creator enrolled.
    #[must_use]
    pub fn open(id: RecruitId, new: NewRecruit, timestamp: String) -> Self {
        let creator = Member {
            uid: new.master_id.clone(),
            position: new.position.clone(),
        };

        Self {
            id,
            master_id: new.master_id,
            title: new.title,
            position: new.position,
            details: new.details,
            members: vec![creator],
            created: timestamp.clone(),
            updated: timestamp,
            is_active: true,
        }
    }

    /// Whether the user is on the roster.
    #[must_use]
    pub fn has_member(&self, uid: &UserId) -> bool {
        self.members.iter().any(|m| &m.uid == uid)
    }

    /// Projection used for notification rendering.
    #[must_use]
    pub fn summary(&self) -> RecruitSummary {
        RecruitSummary {
            id: self.id,
            master_id: self.master_id.clone(),
            title: self.title.clone(),
            event_day: self.details.event_day.clone(),
            day: self.details.day.clone(),
            slack_url: self.details.slack_url.clone(),
            members: self.members.clone(),
        }
    }
}

/// Board as received from a caller; nothing is trusted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitDraft {
    /// Creator.
    #[serde(default)]
    pub master_id: Option<String>,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Creator's role.
    #[serde(default)]
    pub position: Option<String>,
    /// Descriptive fields.
    #[serde(flatten)]
    pub details: RecruitDetails,
}

impl RecruitDraft {
    /// Check required fields once, at the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::InvalidRequest`] when `masterId`, `title` or
    /// `position` is absent or blank.
    pub fn validate(self) -> Result<NewRecruit> {
        let master_id = required(self.master_id, "masterId")?;
        let title = required(self.title, "title")?;
        let position = required(self.position, "position")?;

        Ok(NewRecruit {
            master_id: UserId(master_id),
            title,
            position: Position::from(position),
            details: self.details,
        })
    }
}

/// A validated draft, ready for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecruit {
    /// Creator.
    pub master_id: UserId,
    /// Title.
    pub title: String,
    /// Creator's role.
    pub position: Position,
    /// Descriptive fields.
    pub details: RecruitDetails,
}

/// Inbound join body. The recruit id comes from the path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Joining user.
    #[serde(default)]
    pub uid: Option<String>,
    /// Requested role.
    #[serde(default)]
    pub position: Option<String>,
}

impl JoinRequest {
    /// Convenience constructor with both fields present.
    pub fn new(uid: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            position: Some(position.into()),
        }
    }

    /// Turn the request into a roster entry.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::InvalidRequest`] if `uid` or `position` is absent or blank.
    pub fn validate(self) -> Result<Member> {
        let uid = required(self.uid, "uid")?;
        let position = required(self.position, "position")?;
        Ok(Member::new(uid, position))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RecruitError::invalid(format!("{field} is required")))
}

/// End user record, owned by user management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    pub uid: UserId,
    /// Display name.
    pub name: String,
    /// Mail address.
    pub email: String,
    /// Whether the user is signed in.
    #[serde(default)]
    pub is_login: bool,
    /// Whether the account is enabled.
    #[serde(default)]
    pub is_active: bool,
}

impl User {
    /// Projection used for notification rendering.
    #[must_use]
    pub fn contact(&self) -> Contact {
        Contact {
            uid: self.uid.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The user fields a notice needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Identifier.
    pub uid: UserId,
    /// Display name.
    pub name: String,
    /// Mail address.
    pub email: String,
}

/// The recruit fields a notice needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruitSummary {
    /// Identifier.
    pub id: RecruitId,
    /// Creator.
    pub master_id: UserId,
    /// Title.
    pub title: String,
    /// First day of the event.
    pub event_day: Option<String>,
    /// Duration in days.
    pub day: Option<String>,
    /// Team chat invite URL.
    pub slack_url: Option<String>,
    /// Roster at lookup time.
    pub members: Vec<Member>,
}

// ═══════════════════════════════════════════════════════════════════════
// Workflow state
// ═══════════════════════════════════════════════════════════════════════

/// Where a join is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPhase {
    /// Request accepted, append pending.
    Received,
    /// Member appended, organizer notice pending.
    Appended,
    /// Organizer notice attempted.
    NotifiedOrganizer,
    /// Joiner notice attempted.
    NotifiedMember,
    /// Finished. The join is released from [`RecruitState`].
    Complete,
    /// Stopped before the append took effect. The join is released from
    /// [`RecruitState`].
    Aborted,
}

/// Result of one best-effort notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeOutcome {
    /// Handed to the transport.
    Sent,
    /// The transport failed.
    Failed(NotificationError),
    /// Recipient data could not be resolved, nothing was sent.
    Abandoned(RecruitError),
}

impl NoticeOutcome {
    /// Whether the notice reached the transport successfully.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Progress of one join request that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinProgress {
    /// Target board.
    pub recruit_id: RecruitId,
    /// Roster entry being appended.
    pub member: Member,
    /// Current phase.
    pub phase: JoinPhase,
    /// Outcome of the organizer notice.
    pub organizer_notice: Option<NoticeOutcome>,
}

impl JoinProgress {
    /// A join that has just been received.
    #[must_use]
    pub const fn received(recruit_id: RecruitId, member: Member) -> Self {
        Self {
            recruit_id,
            member,
            phase: JoinPhase::Received,
            organizer_notice: None,
        }
    }
}

/// Requests still running in this process, keyed by correlation id.
///
/// Entries live for one request: they are inserted when the command is
/// accepted and removed on its terminal action.
#[derive(Debug, Clone, Default)]
pub struct RecruitState {
    /// Joins between validation and their terminal action.
    pub joins: HashMap<Uuid, JoinProgress>,
    /// Creations waiting on the sequence and the store.
    pub creations: HashSet<Uuid>,
}

impl RecruitState {
    /// Number of joins still running.
    #[must_use]
    pub fn joins_in_flight(&self) -> usize {
        self.joins.len()
    }

    /// Number of creations still running.
    #[must_use]
    pub fn creations_in_flight(&self) -> usize {
        self.creations.len()
    }
}

/// What a caller gets back from a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    /// Board joined.
    pub recruit_id: RecruitId,
    /// Roster entry appended.
    pub member: Member,
    /// Organizer notice result.
    pub organizer_notice: NoticeOutcome,
    /// Joiner notice result.
    pub member_notice: NoticeOutcome,
}
