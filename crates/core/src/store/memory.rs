//! In-process implementation of the storage ports.
//!
//! Backs fixture catalogs in tests and tooling. Ids are assigned from a
//! counter starting at 1, mirroring a BIGSERIAL column.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ObservationStore, ServiceRepository};
use crate::error::CoreError;
use crate::service::{CreateService, Failure, Hit, Service};
use crate::types::{DbId, Timestamp};

/// Services, hits and failures kept in memory.
#[derive(Default)]
pub struct MemoryStore {
    services: RwLock<Vec<Service>>,
    hits: RwLock<Vec<Hit>>,
    failures: RwLock<Vec<Failure>>,
    next_id: AtomicI64,
    /// When set, every port method fails with [`CoreError::Storage`].
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Append a hit for `service_id`.
    pub async fn record_hit(&self, service_id: DbId, latency: f64, at: Timestamp) -> Hit {
        let hit = Hit {
            id: self.allocate_id(),
            service_id,
            latency,
            created_at: at,
        };
        self.hits.write().await.push(hit.clone());
        hit
    }

    /// Append a failure for `service_id`.
    pub async fn record_failure(
        &self,
        service_id: DbId,
        issue: impl Into<String>,
        at: Timestamp,
    ) -> Failure {
        let failure = Failure {
            id: self.allocate_id(),
            service_id,
            issue: issue.into(),
            created_at: at,
        };
        self.failures.write().await.push(failure.clone());
        failure
    }

    fn allocate_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_available(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("memory store unavailable".to_string()));
        }
        Ok(())
    }

    async fn hits_for(&self, service_id: DbId) -> Vec<Hit> {
        let mut hits: Vec<Hit> = self
            .hits
            .read()
            .await
            .iter()
            .filter(|h| h.service_id == service_id)
            .cloned()
            .collect();
        hits.sort_by_key(|h| (h.created_at, h.id));
        hits
    }

    async fn failures_for(&self, service_id: DbId) -> Vec<Failure> {
        let mut failures: Vec<Failure> = self
            .failures
            .read()
            .await
            .iter()
            .filter(|f| f.service_id == service_id)
            .cloned()
            .collect();
        failures.sort_by_key(|f| (f.created_at, f.id));
        failures
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn load_all(&self) -> Result<Vec<Service>, CoreError> {
        self.check_available()?;
        let mut services = self.services.read().await.clone();
        services.sort_by_key(|s| s.id);
        Ok(services)
    }

    async fn insert(&self, input: &CreateService) -> Result<DbId, CoreError> {
        self.check_available()?;
        let id = self.allocate_id();
        let service = Service::from_create(id, Utc::now(), input);
        self.services.write().await.push(service);
        Ok(id)
    }

    async fn remove(&self, id: DbId) -> Result<u64, CoreError> {
        self.check_available()?;
        let mut services = self.services.write().await;
        let before = services.len();
        services.retain(|s| s.id != id);
        Ok((before - services.len()) as u64)
    }
}

#[async_trait]
impl ObservationStore for MemoryStore {
    async fn total_hits(&self, service_id: DbId) -> Result<i64, CoreError> {
        self.check_available()?;
        Ok(self.hits_for(service_id).await.len() as i64)
    }

    async fn sum_latency(&self, service_id: DbId) -> Result<f64, CoreError> {
        self.check_available()?;
        Ok(self.hits_for(service_id).await.iter().map(|h| h.latency).sum())
    }

    async fn total_failures(&self, service_id: DbId) -> Result<i64, CoreError> {
        self.check_available()?;
        Ok(self.failures_for(service_id).await.len() as i64)
    }

    async fn total_failures_since(
        &self,
        service_id: DbId,
        since: Timestamp,
    ) -> Result<i64, CoreError> {
        self.check_available()?;
        let failures = self.failures_for(service_id).await;
        Ok(failures.iter().filter(|f| f.created_at >= since).count() as i64)
    }

    async fn hits(&self, service_id: DbId) -> Result<Vec<Hit>, CoreError> {
        self.check_available()?;
        Ok(self.hits_for(service_id).await)
    }

    async fn failures(&self, service_id: DbId) -> Result<Vec<Failure>, CoreError> {
        self.check_available()?;
        Ok(self.failures_for(service_id).await)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
