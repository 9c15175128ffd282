//! Repository for the `failures` table (append-only time-series).

use sqlx::{PgExecutor, PgPool};
use uptime_core::types::{DbId, Timestamp};

use crate::models::observation::{CreateFailure, FailureRow};

/// Column list for `failures` SELECT queries.
const COLUMNS: &str = "id, service_id, issue, created_at";

/// Provides query operations for unsuccessful probes.
pub struct FailureRepo;

impl FailureRepo {
    /// Record a single failure.
    pub async fn insert(pool: &PgPool, failure: &CreateFailure) -> Result<FailureRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO failures (service_id, issue, created_at) \
             VALUES ($1, $2, COALESCE($3, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FailureRow>(&query)
            .bind(failure.service_id)
            .bind(&failure.issue)
            .bind(failure.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Number of failures ever recorded for a service.
    pub async fn count_for_service(pool: &PgPool, service_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM failures WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(pool)
            .await
    }

    /// Number of failures recorded at or after `since`.
    pub async fn count_since(
        pool: &PgPool,
        service_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM failures WHERE service_id = $1 AND created_at >= $2",
        )
        .bind(service_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// All failures for a service, oldest first.
    ///
    /// Accepts a pool or an open transaction.
    pub async fn list_for_service<'e, E>(
        executor: E,
        service_id: DbId,
    ) -> Result<Vec<FailureRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM failures \
             WHERE service_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, FailureRow>(&query)
            .bind(service_id)
            .fetch_all(executor)
            .await
    }
}
