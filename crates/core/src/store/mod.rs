//! Storage ports consumed by the catalog.
//!
//! - [`ServiceRepository`] maps services to and from persisted rows.
//! - [`ObservationStore`] answers per-service hit/failure queries.
//!
//! `uptime-db` implements both against PostgreSQL; [`memory::MemoryStore`]
//! implements them in process for fixtures and tests.

pub mod memory;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::service::{CreateService, Failure, Hit, Service};
use crate::types::{DbId, Timestamp};
use crate::uptime::ObservationSnapshot;

/// Persistence adapter for service rows.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Every service shell (derived fields unset), ordered by id ascending.
    async fn load_all(&self) -> Result<Vec<Service>, CoreError>;

    /// Insert a new service and return its generated id.
    async fn insert(&self, input: &CreateService) -> Result<DbId, CoreError>;

    /// Delete a service row. Returns the number of rows removed; zero is not
    /// an error.
    async fn remove(&self, id: DbId) -> Result<u64, CoreError>;
}

/// Per-service accessors over the append-only hit/failure log.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    async fn total_hits(&self, service_id: DbId) -> Result<i64, CoreError>;

    /// Sum of hit latencies in seconds.
    async fn sum_latency(&self, service_id: DbId) -> Result<f64, CoreError>;

    async fn total_failures(&self, service_id: DbId) -> Result<i64, CoreError>;

    /// Failures recorded at or after `since`.
    async fn total_failures_since(
        &self,
        service_id: DbId,
        since: Timestamp,
    ) -> Result<i64, CoreError>;

    /// All hits, oldest first.
    async fn hits(&self, service_id: DbId) -> Result<Vec<Hit>, CoreError>;

    /// All failures, oldest first.
    async fn failures(&self, service_id: DbId) -> Result<Vec<Failure>, CoreError>;

    /// Gather one service's history, with the rolling window ending at `now`.
    ///
    /// Every count is derived from the same hit and failure lists, so the
    /// time series always has `total_hits` points. Stores that can read both
    /// lists atomically should override this.
    async fn snapshot(
        &self,
        service_id: DbId,
        now: Timestamp,
    ) -> Result<ObservationSnapshot, CoreError> {
        let hits = self.hits(service_id).await?;
        let failures = self.failures(service_id).await?;
        Ok(ObservationSnapshot::from_history(hits, failures, now))
    }
}
