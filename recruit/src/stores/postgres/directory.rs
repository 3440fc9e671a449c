//! `PostgreSQL` directory.

use crate::error::{RecruitError, Result};
use crate::providers::Directory;
use crate::state::{Contact, RecruitId, RecruitSummary, User, UserId};
use crate::stores::postgres::{PostgresRecruitStore, storage_error};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Lookups over `recruits` and `end_users`, ignoring `is_active`.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: PgPool,
}

impl PostgresDirectory {
    /// Create a directory over a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user, or overwrite the one with the same uid.
    ///
    /// # Errors
    ///
    /// Returns [`RecruitError::StorageUnavailable`] on storage failure.
    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO end_users (uid, name, email, is_login, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (uid)
            DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email,
                          is_login = EXCLUDED.is_login, is_active = EXCLUDED.is_active
            ",
        )
        .bind(user.uid.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.is_login)
        .bind(user.is_active)
        .execute(&self.pool)
        .await
        .map_err(storage_error("Failed to save user"))?;

        tracing::debug!(uid = %user.uid, "User saved");
        Ok(())
    }
}

fn row_to_contact(row: &PgRow) -> std::result::Result<Contact, sqlx::Error> {
    Ok(Contact {
        uid: UserId(row.try_get("uid")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
    })
}

impl Directory for PostgresDirectory {
    async fn get_recruit(&self, id: RecruitId) -> Result<RecruitSummary> {
        let row = sqlx::query(
            r"
            SELECT id, master_id, title, position, details, members, created, updated, is_active
            FROM recruits
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("Failed to look up recruit"))?
        .ok_or(RecruitError::RecruitNotFound(id))?;

        Ok(PostgresRecruitStore::row_to_recruit(&row)?.summary())
    }

    async fn get_user(&self, uid: &UserId) -> Result<Contact> {
        let row = sqlx::query("SELECT uid, name, email FROM end_users WHERE uid = $1")
            .bind(uid.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to look up user"))?
            .ok_or_else(|| RecruitError::UserNotFound(uid.clone()))?;

        row_to_contact(&row).map_err(storage_error("Failed to decode user"))
    }
}
