//! `PostgreSQL` sequence generator.

use crate::error::Result;
use crate::providers::SequenceGenerator;
use crate::stores::postgres::storage_error;
use sqlx::PgPool;

/// Counters in `atomic_counters`.
///
/// Each call is one upsert statement, so the row lock serializes concurrent
/// increments and a missing counter starts at 1.
#[derive(Debug, Clone)]
pub struct PostgresSequenceGenerator {
    pool: PgPool,
}

impl PostgresSequenceGenerator {
    /// Create a generator over a pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SequenceGenerator for PostgresSequenceGenerator {
    async fn next_value(&self, sequence: &str) -> Result<i64> {
        let (value,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO atomic_counters (count_key, count_number)
            VALUES ($1, 1)
            ON CONFLICT (count_key)
            DO UPDATE SET count_number = atomic_counters.count_number + 1
            RETURNING count_number
            ",
        )
        .bind(sequence)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("Failed to increment counter"))?;

        tracing::debug!(sequence, value, "Counter incremented");
        Ok(value)
    }
}
