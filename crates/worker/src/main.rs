use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uptime_core::scheduler::CheckScheduler;
use uptime_core::ServiceCatalog;
use uptime_db::PgStore;
use uptime_events::CheckQueue;
use uptime_worker::background::{catalog_refresh, check_dispatch};
use uptime_worker::config::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uptime_worker=debug,uptime_core=debug,uptime_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env()?;
    tracing::info!(
        max_connections = config.max_connections,
        refresh_interval_secs = config.refresh_interval_secs,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = uptime_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    uptime_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    uptime_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Catalog ---
    let (queue, checks) = CheckQueue::channel();
    let store = Arc::new(PgStore::new(pool));
    let catalog = Arc::new(ServiceCatalog::with_store(store, Arc::new(queue.clone())));

    // Without a first snapshot there is nothing to serve.
    let services = catalog
        .refresh()
        .await
        .context("Initial service catalog load failed")?;
    tracing::info!(
        count = services.len(),
        online = catalog.count_online().await,
        "Service catalog loaded"
    );

    // Every known service needs a prober after a restart.
    for service in services.iter() {
        queue.schedule_check(service.id);
    }

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let refresh_handle = tokio::spawn(catalog_refresh::run(
        Arc::clone(&catalog),
        config.refresh_interval(),
        cancel.clone(),
    ));
    let dispatch_handle = tokio::spawn(check_dispatch::run(
        Arc::clone(&catalog),
        checks,
        cancel.clone(),
    ));
    tracing::info!("Background tasks started (catalog refresh, check dispatch)");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    cancel.cancel();
    let (refresh, dispatch) = tokio::join!(refresh_handle, dispatch_handle);
    refresh.context("Catalog refresh task panicked")?;
    let dispatched = dispatch.context("Check dispatch task panicked")?;
    tracing::info!(dispatched, "Worker stopped");

    Ok(())
}
