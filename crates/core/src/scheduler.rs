//! Port to the external probing scheduler.

use crate::types::DbId;

/// Receives "start checking this service" signals.
///
/// Fire-and-forget: implementations must not block and report nothing back.
/// The channel-backed implementation lives in `uptime-events`.
pub trait CheckScheduler: Send + Sync {
    fn schedule_check(&self, service_id: DbId);
}
