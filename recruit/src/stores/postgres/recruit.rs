//! `PostgreSQL` recruit store.

use crate::error::{RecruitError, Result};
use crate::providers::RecruitStore;
use crate::state::{Member, Position, Recruit, RecruitDetails, RecruitId, UserId};
use crate::stores::postgres::storage_error;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

const RECRUIT_COLUMNS: &str =
    "id, master_id, title, position, details, members, created, updated, is_active";

fn decode_recruit(row: &PgRow) -> std::result::Result<Recruit, sqlx::Error> {
    let Json(details): Json<RecruitDetails> = row.try_get("details")?;
    let Json(members): Json<Vec<Member>> = row.try_get("members")?;

    Ok(Recruit {
        id: RecruitId(row.try_get("id")?),
        master_id: UserId(row.try_get("master_id")?),
        title: row.try_get("title")?,
        position: Position::from(row.try_get::<String, _>("position")?),
        details,
        members,
        created: row.try_get("created")?,
        updated: row.try_get("updated")?,
        is_active: row.try_get("is_active")?,
    })
}

/// Recruits in the `recruits` table.
#[derive(Debug, Clone)]
pub struct PostgresRecruitStore {
    pool: PgPool,
}

impl PostgresRecruitStore {
    /// Create a store over a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hide or show a recruit.
    ///
    /// # Errors
    ///
    /// - [`RecruitError::RecruitNotFound`] if no record has this identifier
    /// - [`RecruitError::StorageUnavailable`] on storage failure
    pub async fn set_active(&self, id: RecruitId, is_active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE recruits SET is_active = $2 WHERE id = $1")
            .bind(id.0)
            .bind(is_active)
            .execute(&self.pool)
            .await
            .map_err(storage_error("Failed to update recruit"))?;

        if result.rows_affected() == 0 {
            return Err(RecruitError::RecruitNotFound(id));
        }
        Ok(())
    }

    pub(crate) fn row_to_recruit(row: &PgRow) -> Result<Recruit> {
        decode_recruit(row).map_err(storage_error("Failed to decode recruit"))
    }

    async fn fetch_active(&self, filter: &str, bind: Option<Json<serde_json::Value>>) -> Result<Vec<Recruit>> {
        let sql = format!(
            "SELECT {RECRUIT_COLUMNS} FROM recruits WHERE is_active {filter} ORDER BY id DESC"
        );
        let query = sqlx::query(&sql);
        let query = match bind {
            Some(value) => query.bind(value),
            None => query,
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list recruits"))?;

        rows.iter().map(Self::row_to_recruit).collect()
    }
}

impl RecruitStore for PostgresRecruitStore {
    async fn list_active(&self) -> Result<Vec<Recruit>> {
        self.fetch_active("", None).await
    }

    async fn get_by_id(&self, id: RecruitId) -> Result<Recruit> {
        let sql = format!("SELECT {RECRUIT_COLUMNS} FROM recruits WHERE id = $1 AND is_active");
        let rows = sqlx::query(&sql)
            .bind(id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to get recruit"))?;

        if rows.len() > 1 {
            tracing::warn!(recruit_id = %id, matches = rows.len(), "Several recruits share one id");
        }

        let row = rows.first().ok_or(RecruitError::RecruitNotFound(id))?;
        Self::row_to_recruit(row)
    }

    async fn insert(&self, recruit: &Recruit) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO recruits
                (id, master_id, title, position, details, members, created, updated, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(recruit.id.0)
        .bind(recruit.master_id.as_str())
        .bind(&recruit.title)
        .bind(recruit.position.as_str())
        .bind(Json(&recruit.details))
        .bind(Json(&recruit.members))
        .bind(&recruit.created)
        .bind(&recruit.updated)
        .bind(recruit.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return RecruitError::StorageUnavailable(format!(
                        "Recruit {} already exists",
                        recruit.id
                    ));
                }
            }
            RecruitError::StorageUnavailable(format!("Failed to insert recruit: {e}"))
        })?;

        Ok(())
    }

    async fn append_member(&self, id: RecruitId, member: &Member, updated: &str) -> Result<Recruit> {
        // `||` appends inside the UPDATE, so concurrent joins never overwrite each other.
        let sql = format!(
            "UPDATE recruits SET members = members || $2::jsonb, updated = $3 \
             WHERE id = $1 RETURNING {RECRUIT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.0)
            .bind(Json([member]))
            .bind(updated)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to append member"))?
            .ok_or(RecruitError::RecruitNotFound(id))?;

        Self::row_to_recruit(&row)
    }

    async fn list_posted_by(&self, master_id: &UserId) -> Result<Vec<Recruit>> {
        let sql = format!(
            "SELECT {RECRUIT_COLUMNS} FROM recruits WHERE is_active AND master_id = $1 ORDER BY id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(master_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list posted recruits"))?;

        rows.iter().map(Self::row_to_recruit).collect()
    }

    async fn list_joined_by(&self, uid: &UserId) -> Result<Vec<Recruit>> {
        let containment = serde_json::json!([{ "uid": uid.as_str() }]);
        self.fetch_active("AND members @> $1::jsonb", Some(Json(containment)))
            .await
    }
}
