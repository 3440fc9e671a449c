//! # GuildHack Recruit Board
//!
//! Team-formation boards for hackathons: users post a recruit, others join it
//! in a role, and both the organizer and the new member get a notice by mail.
//!
//! ## Architecture
//!
//! - **Providers** (`providers`): traits for the sequence generator, the recruit
//!   store, the directory and the mail transport
//! - **Reducers** (`reducers`): the creation and membership join workflows,
//!   run by the [`guildhack_runtime::Store`]
//! - **Board** (`board`): request-level facade a transport layer calls
//! - **Stores** (`stores`, feature `postgres`): `PostgreSQL` implementations
//! - **Mocks** (`mocks`, feature `test-utils`): in-memory implementations
//!
//! ## Join workflow
//!
//! ```text
//! Received → Appended → NotifiedOrganizer → NotifiedMember → Complete
//!     ↘ Aborted
//! ```
//!
//! The append is the only step that can fail a join. Notices are best effort:
//! their failures are logged and reported in the [`JoinReport`].
//!
//! ## Example
//!
//! ```no_run
//! use guildhack_core::environment::SystemClock;
//! use guildhack_recruit::mocks::{
//!     InMemoryDirectory, InMemoryRecruitStore, InMemorySequenceGenerator, RecordingDispatcher,
//! };
//! use guildhack_recruit::{BoardConfig, JoinRequest, MailConfig, RecruitBoard, RecruitDraft, RecruitEnvironment};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> guildhack_recruit::Result<()> {
//! let recruits = InMemoryRecruitStore::new();
//! let env = RecruitEnvironment::new(
//!     InMemorySequenceGenerator::new(),
//!     recruits.clone(),
//!     InMemoryDirectory::new(recruits),
//!     RecordingDispatcher::new(),
//!     Arc::new(SystemClock),
//!     BoardConfig::default(),
//!     MailConfig::default(),
//! );
//! let board = RecruitBoard::new(env, Duration::from_secs(5));
//!
//! let recruit = board
//!     .create(RecruitDraft {
//!         master_id: Some("u1".into()),
//!         title: Some("Spring Hack".into()),
//!         position: Some("backend".into()),
//!         ..RecruitDraft::default()
//!     })
//!     .await?;
//! let report = board.join(recruit.id, JoinRequest::new("u2", "frontend")).await?;
//! assert_eq!(report.member.uid.as_str(), "u2");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod actions;
pub mod board;
pub mod config;
pub mod environment;
pub mod error;
#[cfg(feature = "test-utils")]
pub mod mocks;
pub mod notice;
pub mod providers;
pub mod reducers;
pub mod state;
#[cfg(feature = "postgres")]
pub mod stores;
pub mod utils;

pub use actions::RecruitAction;
pub use board::RecruitBoard;
pub use config::{AppConfig, BoardConfig, DatabaseConfig, MailConfig, SmtpConfig};
pub use environment::RecruitEnvironment;
pub use error::{NotificationError, RecruitError, Result};
pub use notice::{NoticeData, NoticeKind, render_notice};
pub use providers::MailInfo;
pub use reducers::RecruitReducer;
pub use state::{
    Contact, JoinPhase, JoinReport, JoinRequest, Member, NoticeOutcome, Position, Recruit,
    RecruitDetails, RecruitDraft, RecruitId, RecruitState, RecruitSummary, User, UserId,
};
