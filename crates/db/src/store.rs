//! PostgreSQL implementation of the `uptime-core` storage ports.

use async_trait::async_trait;
use sqlx::PgPool;
use uptime_core::error::CoreError;
use uptime_core::service::{CreateService, Failure, Hit, Service};
use uptime_core::store::{ObservationStore, ServiceRepository};
use uptime_core::types::{DbId, Timestamp};
use uptime_core::uptime::ObservationSnapshot;

use crate::repositories::{FailureRepo, HitRepo, ServiceRepo};

/// Serves both storage ports from one connection pool.
///
/// Cheap to clone; the pool is reference counted.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Read a service's hits and failures from one `REPEATABLE READ`
    /// snapshot, so hits appended mid-read are either all seen or not at all.
    async fn read_history(
        &self,
        service_id: DbId,
    ) -> Result<(Vec<Hit>, Vec<Failure>), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let hits = HitRepo::list_for_service(&mut *tx, service_id).await?;
        let failures = FailureRepo::list_for_service(&mut *tx, service_id).await?;

        tx.commit().await?;
        Ok((
            hits.into_iter().map(Hit::from).collect(),
            failures.into_iter().map(Failure::from).collect(),
        ))
    }
}

/// Surface a sqlx failure as a storage fault. No retry happens here.
fn storage_fault(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Storage query failed");
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl ServiceRepository for PgStore {
    async fn load_all(&self) -> Result<Vec<Service>, CoreError> {
        let rows = ServiceRepo::list(&self.pool).await.map_err(storage_fault)?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn insert(&self, input: &CreateService) -> Result<DbId, CoreError> {
        ServiceRepo::create(&self.pool, input)
            .await
            .map_err(storage_fault)
    }

    async fn remove(&self, id: DbId) -> Result<u64, CoreError> {
        ServiceRepo::delete(&self.pool, id)
            .await
            .map_err(storage_fault)
    }
}

#[async_trait]
impl ObservationStore for PgStore {
    async fn total_hits(&self, service_id: DbId) -> Result<i64, CoreError> {
        HitRepo::count_for_service(&self.pool, service_id)
            .await
            .map_err(storage_fault)
    }

    async fn sum_latency(&self, service_id: DbId) -> Result<f64, CoreError> {
        HitRepo::sum_latency_for_service(&self.pool, service_id)
            .await
            .map_err(storage_fault)
    }

    async fn total_failures(&self, service_id: DbId) -> Result<i64, CoreError> {
        FailureRepo::count_for_service(&self.pool, service_id)
            .await
            .map_err(storage_fault)
    }

    async fn total_failures_since(
        &self,
        service_id: DbId,
        since: Timestamp,
    ) -> Result<i64, CoreError> {
        FailureRepo::count_since(&self.pool, service_id, since)
            .await
            .map_err(storage_fault)
    }

    async fn hits(&self, service_id: DbId) -> Result<Vec<Hit>, CoreError> {
        let rows = HitRepo::list_for_service(&self.pool, service_id)
            .await
            .map_err(storage_fault)?;
        Ok(rows.into_iter().map(Hit::from).collect())
    }

    async fn failures(&self, service_id: DbId) -> Result<Vec<Failure>, CoreError> {
        let rows = FailureRepo::list_for_service(&self.pool, service_id)
            .await
            .map_err(storage_fault)?;
        Ok(rows.into_iter().map(Failure::from).collect())
    }

    async fn snapshot(
        &self,
        service_id: DbId,
        now: Timestamp,
    ) -> Result<ObservationSnapshot, CoreError> {
        let (hits, failures) = self.read_history(service_id).await.map_err(storage_fault)?;
        Ok(ObservationSnapshot::from_history(hits, failures, now))
    }
}
