//! Periodic reload of the service catalog.
//!
//! Re-reads every service and recomputes its statistics on a fixed interval
//! using `tokio::time::interval`. A failed refresh is logged and the last
//! good snapshot keeps being served.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uptime_core::ServiceCatalog;

/// Run the catalog refresh loop until `cancel` is triggered.
///
/// The first refresh happens one `interval` after start; the caller is
/// expected to have loaded the catalog already.
pub async fn run(catalog: Arc<ServiceCatalog>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Catalog refresh job started");

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Catalog refresh job stopping");
                break;
            }
            _ = ticker.tick() => {
                match catalog.refresh().await {
                    Ok(services) => {
                        let online = services.iter().filter(|s| s.online).count();
                        tracing::debug!(count = services.len(), online, "Catalog refresh: done");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Catalog refresh failed; serving last snapshot");
                    }
                }
            }
        }
    }
}
