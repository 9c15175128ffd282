//! In-memory catalog of monitored services.
//!
//! [`ServiceCatalog`] holds the current, fully enriched list of services and
//! is designed to be shared via `Arc<ServiceCatalog>`. The list lives behind
//! an `RwLock<Arc<Vec<Service>>>` and is replaced wholesale on every refresh,
//! so readers never observe a partially updated list.
//!
//! Refreshes are serialized: each one loads, enriches and swaps while holding
//! a guard, so a refresh that started earlier can never install its rows over
//! a later one.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::error::CoreError;
use crate::scheduler::CheckScheduler;
use crate::service::{CreateService, Service};
use crate::store::{ObservationStore, ServiceRepository};
use crate::types::DbId;
use crate::uptime::enrich;

pub struct ServiceCatalog {
    repository: Arc<dyn ServiceRepository>,
    observations: Arc<dyn ObservationStore>,
    scheduler: Arc<dyn CheckScheduler>,
    services: RwLock<Arc<Vec<Service>>>,
    refresh_guard: Mutex<()>,
}

impl ServiceCatalog {
    /// Create an empty catalog. Call [`refresh`](Self::refresh) to load it.
    pub fn new(
        repository: Arc<dyn ServiceRepository>,
        observations: Arc<dyn ObservationStore>,
        scheduler: Arc<dyn CheckScheduler>,
    ) -> Self {
        Self {
            repository,
            observations,
            scheduler,
            services: RwLock::new(Arc::new(Vec::new())),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Create an empty catalog over a store that serves both ports.
    pub fn with_store<S>(store: Arc<S>, scheduler: Arc<dyn CheckScheduler>) -> Self
    where
        S: ServiceRepository + ObservationStore + 'static,
    {
        Self::new(store.clone(), store, scheduler)
    }

    /// Reload every service from the repository, enrich it, and swap the
    /// snapshot.
    ///
    /// On error the previous snapshot is left untouched.
    pub async fn refresh(&self) -> Result<Arc<Vec<Service>>, CoreError> {
        let _guard = self.refresh_guard.lock().await;

        let mut services = self.repository.load_all().await?;
        let now = Utc::now();

        for service in services.iter_mut() {
            let snapshot = self.observations.snapshot(service.id, now).await?;
            enrich(service, &snapshot)?;
        }

        let services = Arc::new(services);
        *self.services.write().await = Arc::clone(&services);
        tracing::debug!(count = services.len(), "Service catalog refreshed");
        Ok(services)
    }

    /// The current snapshot, ordered by id ascending.
    pub async fn services(&self) -> Arc<Vec<Service>> {
        Arc::clone(&*self.services.read().await)
    }

    /// Find a service in the current snapshot.
    pub async fn select(&self, id: DbId) -> Option<Service> {
        self.services
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Number of services whose newest observation is a hit.
    pub async fn count_online(&self) -> usize {
        self.services.read().await.iter().filter(|s| s.online).count()
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }

    /// Insert a service, reload the catalog, and ask the scheduler to start
    /// probing it.
    ///
    /// Returns as soon as the insert and refresh succeed; the first probe
    /// happens asynchronously. If the refresh fails the row is already
    /// persisted and no check is scheduled.
    pub async fn create(&self, input: &CreateService) -> Result<DbId, CoreError> {
        let id = self.repository.insert(input).await?;
        tracing::info!(service_id = id, name = %input.name, "Service created");

        self.refresh().await?;
        self.scheduler.schedule_check(id);
        Ok(id)
    }

    /// Delete a service row.
    ///
    /// The in-memory snapshot is not updated: the deleted service stays
    /// visible until the next [`refresh`](Self::refresh).
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        let removed = self.repository.remove(id).await?;
        if removed == 0 {
            tracing::debug!(service_id = id, "Delete matched no service");
        } else {
            tracing::info!(service_id = id, "Service deleted");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Duration;
    use tokio::sync::Notify;

    use super::*;
    use crate::store::memory::MemoryStore;

    #[derive(Default)]
    struct RecordingScheduler {
        requested: std::sync::Mutex<Vec<DbId>>,
    }

    impl CheckScheduler for RecordingScheduler {
        fn schedule_check(&self, service_id: DbId) {
            self.requested.lock().unwrap().push(service_id);
        }
    }

    fn input(name: &str) -> CreateService {
        CreateService {
            name: name.to_string(),
            domain: format!("https://{name}.example.com"),
            expected: "ok".to_string(),
            expected_status: 200,
            interval: 60,
            method: "GET".to_string(),
            port: 443,
        }
    }

    fn catalog() -> (ServiceCatalog, Arc<MemoryStore>, Arc<RecordingScheduler>) {
        let store = Arc::new(MemoryStore::new());
        let scheduler = Arc::new(RecordingScheduler::default());
        let catalog = ServiceCatalog::with_store(Arc::clone(&store), scheduler.clone());
        (catalog, store, scheduler)
    }

    // -- create / refresh --------------------------------------------------

    #[tokio::test]
    async fn create_refreshes_and_schedules_check() {
        let (catalog, _store, scheduler) = catalog();

        let id = catalog.create(&input("web")).await.unwrap();

        let services = catalog.services().await;
        assert_eq!(services.len(), 1);
        let service = &services[0];
        assert_eq!(service.id, id);
        assert_eq!(service.total_uptime, "0");
        assert_eq!(service.online_24_hours, 0.0);
        assert_eq!(service.avg_response, "0");
        assert_eq!(service.data, "[]");
        assert!(!service.online);

        assert_eq!(*scheduler.requested.lock().unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn refresh_orders_by_id_and_enriches() {
        let (catalog, store, _) = catalog();
        let first = store.insert(&input("first")).await.unwrap();
        let second = store.insert(&input("second")).await.unwrap();
        let now = Utc::now();
        for i in 0..8 {
            store
                .record_hit(second, 0.2, now - Duration::minutes(30 - i))
                .await;
        }
        store.record_failure(second, "timeout", now - Duration::minutes(5)).await;
        store.record_failure(second, "timeout", now - Duration::minutes(4)).await;

        let services = catalog.refresh().await.unwrap();

        assert_eq!(services[0].id, first);
        assert_eq!(services[1].id, second);
        assert_eq!(services[1].online_24_hours, 75.0);
        assert_eq!(services[1].total_uptime, "75.00");
        assert_eq!(services[1].failures.len(), 2);
        assert!(!services[1].online);
    }

    /// Repository whose first `load_all` parks after reading rows until
    /// released.
    struct StallingRepository {
        inner: Arc<MemoryStore>,
        stall_next_load: AtomicBool,
        loaded: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ServiceRepository for StallingRepository {
        async fn load_all(&self) -> Result<Vec<Service>, CoreError> {
            let rows = self.inner.load_all().await?;
            if self.stall_next_load.swap(false, Ordering::SeqCst) {
                self.loaded.notify_one();
                self.release.notified().await;
            }
            Ok(rows)
        }

        async fn insert(&self, input: &CreateService) -> Result<DbId, CoreError> {
            self.inner.insert(input).await
        }

        async fn remove(&self, id: DbId) -> Result<u64, CoreError> {
            self.inner.remove(id).await
        }
    }

    #[tokio::test]
    async fn slow_refresh_cannot_hide_a_created_service() {
        let store = Arc::new(MemoryStore::new());
        let repository = Arc::new(StallingRepository {
            inner: Arc::clone(&store),
            stall_next_load: AtomicBool::new(true),
            loaded: Notify::new(),
            release: Notify::new(),
        });
        let catalog = Arc::new(ServiceCatalog::new(
            repository.clone(),
            store.clone(),
            Arc::new(RecordingScheduler::default()),
        ));

        // Periodic refresh reads an empty table, then stalls.
        let background = tokio::spawn({
            let catalog = Arc::clone(&catalog);
            async move { catalog.refresh().await }
        });
        repository.loaded.notified().await;

        let create = tokio::spawn({
            let catalog = Arc::clone(&catalog);
            async move { catalog.create(&input("late")).await }
        });
        while store.load_all().await.unwrap().is_empty() {
            tokio::task::yield_now().await;
        }

        repository.release.notify_one();
        background.await.unwrap().unwrap();
        let id = create.await.unwrap().unwrap();

        assert!(catalog.select(id).await.is_some());
        assert_eq!(catalog.len().await, 1);
    }

    #[tokio::test]
    async fn refresh_twice_yields_identical_fields() {
        let (catalog, store, _) = catalog();
        let id = store.insert(&input("steady")).await.unwrap();
        let now = Utc::now();
        store.record_hit(id, 0.4, now - Duration::minutes(2)).await;
        store.record_failure(id, "refused", now - Duration::minutes(1)).await;

        let first = catalog.refresh().await.unwrap();
        let second = catalog.refresh().await.unwrap();

        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let (catalog, store, _) = catalog();
        store.insert(&input("kept")).await.unwrap();
        catalog.refresh().await.unwrap();

        store.set_unavailable(true);
        assert_matches!(catalog.refresh().await, Err(CoreError::Storage(_)));

        assert_eq!(catalog.len().await, 1);
    }

    #[tokio::test]
    async fn failed_create_schedules_nothing() {
        let (catalog, store, scheduler) = catalog();
        store.set_unavailable(true);

        assert_matches!(catalog.create(&input("x")).await, Err(CoreError::Storage(_)));
        assert!(scheduler.requested.lock().unwrap().is_empty());
        assert!(catalog.is_empty().await);
    }

    // -- lookups -----------------------------------------------------------

    #[tokio::test]
    async fn select_finds_by_id() {
        let (catalog, _, _) = catalog();
        let a = catalog.create(&input("a")).await.unwrap();
        let b = catalog.create(&input("b")).await.unwrap();

        assert_eq!(catalog.select(a).await.map(|s| s.name), Some("a".to_string()));
        assert_eq!(catalog.select(b).await.map(|s| s.name), Some("b".to_string()));
    }

    #[tokio::test]
    async fn select_unknown_id_is_none() {
        let (catalog, _, _) = catalog();
        catalog.create(&input("a")).await.unwrap();

        assert!(catalog.select(9999).await.is_none());
    }

    #[tokio::test]
    async fn count_online_counts_services_with_recent_hit() {
        let (catalog, store, _) = catalog();
        let up = store.insert(&input("up")).await.unwrap();
        let down = store.insert(&input("down")).await.unwrap();
        store.insert(&input("unknown")).await.unwrap();
        let now = Utc::now();
        store.record_hit(up, 0.1, now).await;
        store.record_hit(down, 0.1, now - Duration::minutes(3)).await;
        store.record_failure(down, "500", now).await;

        catalog.refresh().await.unwrap();

        assert_eq!(catalog.count_online().await, 1);
    }

    // -- delete ------------------------------------------------------------

    #[tokio::test]
    async fn delete_does_not_touch_snapshot_until_refresh() {
        let (catalog, _, _) = catalog();
        let id = catalog.create(&input("gone")).await.unwrap();

        catalog.delete(id).await.unwrap();
        assert!(catalog.select(id).await.is_some());

        catalog.refresh().await.unwrap();
        assert!(catalog.select(id).await.is_none());
    }

    #[tokio::test]
    async fn delete_unknown_id_is_ok() {
        let (catalog, _, _) = catalog();
        catalog.delete(42).await.unwrap();
    }
}
