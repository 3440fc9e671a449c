//! Recruit board demo.
//!
//! Seeds three users, posts a recruit, joins it twice and prints the result.
//! Records go to `PostgreSQL` when `DATABASE_URL` is set (feature `postgres`)
//! and stay in memory otherwise. Mail goes to the log unless `SMTP_SERVER`
//! is set.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info,guildhack_recruit=debug cargo run --bin recruit-board
//! DATABASE_URL=postgres://localhost/guildhack cargo run --features postgres --bin recruit-board
//! ```

use guildhack_core::environment::SystemClock;
use guildhack_recruit::mocks::{InMemoryDirectory, InMemoryRecruitStore, InMemorySequenceGenerator};
use guildhack_recruit::providers::{
    ConsoleNotificationDispatcher, Directory, MailInfo, NotificationDispatcher, RecruitStore,
    SequenceGenerator, SmtpNotificationDispatcher,
};
use guildhack_recruit::{
    AppConfig, DatabaseConfig, JoinRequest, NotificationError, RecruitBoard, RecruitDetails,
    RecruitDraft, RecruitEnvironment, User, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Console or SMTP, picked at startup.
#[derive(Clone)]
enum Mailer {
    Console(ConsoleNotificationDispatcher),
    Smtp(SmtpNotificationDispatcher),
}

impl NotificationDispatcher for Mailer {
    async fn send(&self, message: &MailInfo) -> Result<(), NotificationError> {
        match self {
            Self::Console(console) => console.send(message).await,
            Self::Smtp(smtp) => smtp.send(message).await,
        }
    }
}

fn demo_users() -> [User; 3] {
    [
        user("u1", "Haruka", "haruka@example.com"),
        user("u2", "Ren", "ren@example.com"),
        user("u3", "Sora", "sora@example.com"),
    ]
}

fn user(uid: &str, name: &str, email: &str) -> User {
    User {
        uid: UserId::from(uid),
        name: name.to_string(),
        email: email.to_string(),
        is_login: true,
        is_active: true,
    }
}

/// Post a recruit as `u1`, join it as `u2` and `u3`, print the active boards.
async fn run<Q, R, D>(env: RecruitEnvironment<Q, R, D, Mailer>, config: &AppConfig) -> anyhow::Result<()>
where
    Q: SequenceGenerator + Clone + 'static,
    R: RecruitStore + Clone + 'static,
    D: Directory + Clone + 'static,
{
    let board = RecruitBoard::new(env, config.request_timeout);

    let recruit = board
        .create(RecruitDraft {
            master_id: Some("u1".to_string()),
            title: Some("GuildHack Spring".to_string()),
            position: Some("backend".to_string()),
            details: RecruitDetails {
                event_day: Some("2025-04-12".to_string()),
                day: Some("2".to_string()),
                slack_url: Some("https://join.slack.com/t/guildhack/shared_invite/demo".to_string()),
                total_member: Some("4".to_string()),
                ..RecruitDetails::default()
            },
        })
        .await?;
    tracing::info!(recruit_id = %recruit.id, "Recruit posted");

    for (uid, position) in [("u2", "frontend"), ("u3", "design")] {
        let report = board.join(recruit.id, JoinRequest::new(uid, position)).await?;
        tracing::info!(
            uid,
            organizer_notice = ?report.organizer_notice,
            member_notice = ?report.member_notice,
            "Joined"
        );
    }

    let active = board.list_active().await?;
    println!("{}", serde_json::to_string_pretty(&active)?);

    board.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

async fn run_in_memory(mailer: Mailer, config: &AppConfig) -> anyhow::Result<()> {
    let recruits = InMemoryRecruitStore::new();
    let directory = InMemoryDirectory::new(recruits.clone());
    for user in demo_users() {
        directory.add_user(user)?;
    }

    let env = RecruitEnvironment::new(
        InMemorySequenceGenerator::new(),
        recruits,
        directory,
        mailer,
        Arc::new(SystemClock),
        config.board.clone(),
        config.mail.clone(),
    );
    run(env, config).await
}

#[cfg(feature = "postgres")]
async fn run_with_database(database: &DatabaseConfig, mailer: Mailer, config: &AppConfig) -> anyhow::Result<()> {
    use guildhack_recruit::stores::postgres::{
        self, PostgresDirectory, PostgresRecruitStore, PostgresSequenceGenerator,
    };

    let pool = postgres::connect(database).await?;
    postgres::migrate(&pool).await?;
    tracing::info!(max_connections = database.max_connections, "Connected to PostgreSQL");

    let directory = PostgresDirectory::new(pool.clone());
    for user in demo_users() {
        directory.upsert_user(&user).await?;
    }

    let env = RecruitEnvironment::new(
        PostgresSequenceGenerator::new(pool.clone()),
        PostgresRecruitStore::new(pool),
        directory,
        mailer,
        Arc::new(SystemClock),
        config.board.clone(),
        config.mail.clone(),
    );
    run(env, config).await
}

#[cfg(not(feature = "postgres"))]
async fn run_with_database(_database: &DatabaseConfig, mailer: Mailer, config: &AppConfig) -> anyhow::Result<()> {
    tracing::warn!("DATABASE_URL is set but built without the postgres feature, keeping records in memory");
    run_in_memory(mailer, config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,guildhack_recruit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!(host = %config.board.host, sequence = %config.board.sequence_name, "Configuration loaded");

    let mailer = match &config.smtp {
        Some(smtp) => {
            tracing::info!(server = %smtp.server, port = smtp.port, "Sending mail over SMTP");
            Mailer::Smtp(SmtpNotificationDispatcher::new(smtp))
        },
        None => Mailer::Console(ConsoleNotificationDispatcher::new()),
    };

    match &config.database {
        Some(database) => run_with_database(database, mailer, &config).await,
        None => run_in_memory(mailer, &config).await,
    }
}
