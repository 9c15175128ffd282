//! Repository for the `services` table.

use sqlx::PgPool;
use uptime_core::service::{CreateService, Service};
use uptime_core::types::DbId;

use crate::models::service::ServiceRow;

/// Column list for `services` queries.
const COLUMNS: &str = "\
    id, name, domain, method, port, expected, \
    expected_status, check_interval, created_at";

/// Provides CRUD operations for monitored services.
pub struct ServiceRepo;

impl ServiceRepo {
    /// Insert a new service, returning the generated id.
    ///
    /// `created_at` is assigned by the database.
    pub async fn create(pool: &PgPool, input: &CreateService) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO services \
                (name, domain, method, port, expected, expected_status, check_interval, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.domain)
        .bind(&input.method)
        .bind(input.port)
        .bind(&input.expected)
        .bind(input.expected_status)
        .bind(input.interval)
        .fetch_one(pool)
        .await
    }

    /// List all services ordered by id ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services ORDER BY id ASC");
        sqlx::query_as::<_, ServiceRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a service by its internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a service by id. Returns the number of rows removed.
    ///
    /// Hits and failures go with it via `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Placeholder: no service attribute is mutable after creation yet.
    ///
    /// Deciding which columns may change (interval, expected status, ...)
    /// has to happen before this issues an UPDATE.
    pub async fn update(_pool: &PgPool, service: &Service) -> Result<(), sqlx::Error> {
        tracing::debug!(service_id = service.id, "Service update is not supported; ignoring");
        Ok(())
    }
}
