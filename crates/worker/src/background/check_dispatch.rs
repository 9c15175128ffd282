//! Hand-off of check requests to the probing scheduler.
//!
//! Drains the [`CheckReceiver`] fed by the catalog and resolves each request
//! against the current catalog snapshot. The prober itself runs outside this
//! process; this task is where it attaches.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uptime_core::ServiceCatalog;
use uptime_events::{CheckReceiver, CheckRequest};

/// Run the dispatch loop until `cancel` fires or every sender is dropped.
///
/// Returns the number of requests dispatched.
pub async fn run(
    catalog: Arc<ServiceCatalog>,
    mut requests: CheckReceiver,
    cancel: CancellationToken,
) -> usize {
    tracing::info!("Check dispatch started");
    let mut dispatched = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(dispatched, "Check dispatch stopping");
                break;
            }
            request = requests.recv() => {
                let Some(request) = request else {
                    tracing::info!(dispatched, "Check queue closed");
                    break;
                };
                if dispatch(&catalog, &request).await {
                    dispatched += 1;
                }
            }
        }
    }

    dispatched
}

/// Resolve a single request. Returns `false` for services that are no
/// longer in the catalog.
async fn dispatch(catalog: &ServiceCatalog, request: &CheckRequest) -> bool {
    match catalog.select(request.service_id).await {
        Some(service) => {
            tracing::info!(
                service_id = service.id,
                domain = %service.domain,
                method = %service.method,
                interval_secs = service.interval,
                "Check requested"
            );
            true
        }
        None => {
            tracing::warn!(
                service_id = request.service_id,
                "Check requested for unknown service; skipping"
            );
            false
        }
    }
}
