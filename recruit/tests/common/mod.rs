//! Shared fixtures for the recruit board integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use guildhack_recruit::mocks::{
    InMemoryDirectory, InMemoryRecruitStore, InMemorySequenceGenerator, RecordingDispatcher,
};
use guildhack_recruit::{
    BoardConfig, MailConfig, RecruitBoard, RecruitDraft, RecruitEnvironment, User, UserId,
};
use guildhack_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

pub type TestBoard = RecruitBoard<
    InMemorySequenceGenerator,
    InMemoryRecruitStore,
    InMemoryDirectory,
    RecordingDispatcher,
>;

pub struct Harness {
    pub board: TestBoard,
    pub sequences: InMemorySequenceGenerator,
    pub recruits: InMemoryRecruitStore,
    pub directory: InMemoryDirectory,
    pub dispatcher: RecordingDispatcher,
}

impl Harness {
    /// Board with users `u1`..`u5`, mailed at `<uid>@example.com`.
    pub fn new() -> Self {
        let sequences = InMemorySequenceGenerator::new();
        let recruits = InMemoryRecruitStore::new();
        let directory = InMemoryDirectory::new(recruits.clone());
        let dispatcher = RecordingDispatcher::new();

        for n in 1..=5 {
            directory
                .add_user(User {
                    uid: UserId(format!("u{n}")),
                    name: format!("User {n}"),
                    email: format!("u{n}@example.com"),
                    is_login: true,
                    is_active: true,
                })
                .unwrap();
        }

        let env = RecruitEnvironment::new(
            sequences.clone(),
            recruits.clone(),
            directory.clone(),
            dispatcher.clone(),
            Arc::new(test_clock()),
            BoardConfig::default(),
            MailConfig::default(),
        );

        Self {
            board: RecruitBoard::new(env, Duration::from_secs(5)),
            sequences,
            recruits,
            directory,
            dispatcher,
        }
    }
}

pub fn draft(master: &str, title: &str, position: &str) -> RecruitDraft {
    RecruitDraft {
        master_id: Some(master.to_string()),
        title: Some(title.to_string()),
        position: Some(position.to_string()),
        ..RecruitDraft::default()
    }
}
