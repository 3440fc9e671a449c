//! `PostgreSQL` storage implementations.
//!
//! - `atomic_counters`: recruit numbering
//! - `recruits`: boards, roster as a JSONB array
//! - `end_users`: read-only user records for notices
//!
//! # Example
//!
//! ```no_run
//! use guildhack_recruit::DatabaseConfig;
//! use guildhack_recruit::stores::postgres::{self, PostgresRecruitStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = postgres::connect(&DatabaseConfig {
//!     url: "postgres://localhost/guildhack".to_string(),
//!     max_connections: 5,
//! })
//! .await?;
//! postgres::migrate(&pool).await?;
//! let recruits = PostgresRecruitStore::new(pool);
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod recruit;
pub mod sequence;

pub use directory::PostgresDirectory;
pub use recruit::PostgresRecruitStore;
pub use sequence::PostgresSequenceGenerator;

use crate::config::DatabaseConfig;
use crate::error::{RecruitError, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`RecruitError::StorageUnavailable`] if the database cannot be reached.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| RecruitError::StorageUnavailable(format!("Failed to connect: {e}")))
}

/// Create the recruit board tables.
///
/// # Errors
///
/// Returns [`RecruitError::StorageUnavailable`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RecruitError::StorageUnavailable(format!("Migration failed: {e}")))
}

pub(crate) fn storage_error(context: &str) -> impl FnOnce(sqlx::Error) -> RecruitError + '_ {
    move |e| RecruitError::StorageUnavailable(format!("{context}: {e}"))
}
