//! Repository for the `hits` table (append-only time-series).

use sqlx::{PgExecutor, PgPool};
use uptime_core::types::DbId;

use crate::models::observation::{CreateHit, HitRow};

/// Column list for `hits` SELECT queries.
const COLUMNS: &str = "id, service_id, latency, created_at";

/// Provides query operations for successful probes.
pub struct HitRepo;

impl HitRepo {
    /// Record a single hit.
    pub async fn insert(pool: &PgPool, hit: &CreateHit) -> Result<HitRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO hits (service_id, latency, created_at) \
             VALUES ($1, $2, COALESCE($3, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HitRow>(&query)
            .bind(hit.service_id)
            .bind(hit.latency)
            .bind(hit.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Number of hits ever recorded for a service.
    pub async fn count_for_service(pool: &PgPool, service_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM hits WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(pool)
            .await
    }

    /// Sum of hit latencies in seconds; `0.0` when there are none.
    pub async fn sum_latency_for_service(
        pool: &PgPool,
        service_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(latency), 0)::DOUBLE PRECISION FROM hits WHERE service_id = $1",
        )
        .bind(service_id)
        .fetch_one(pool)
        .await
    }

    /// All hits for a service, oldest first.
    ///
    /// Accepts a pool or an open transaction.
    pub async fn list_for_service<'e, E>(
        executor: E,
        service_id: DbId,
    ) -> Result<Vec<HitRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM hits \
             WHERE service_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, HitRow>(&query)
            .bind(service_id)
            .fetch_all(executor)
            .await
    }
}
