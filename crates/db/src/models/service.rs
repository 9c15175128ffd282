//! Service row model.

use serde::Serialize;
use sqlx::FromRow;
use uptime_core::service::Service;
use uptime_core::types::{DbId, Timestamp};

/// A row from the `services` table.
///
/// Only static attributes are stored; derived statistics are recomputed on
/// every catalog refresh.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRow {
    pub id: DbId,
    pub name: String,
    pub domain: String,
    pub method: String,
    pub port: i32,
    pub expected: String,
    pub expected_status: i32,
    pub check_interval: i32,
    pub created_at: Timestamp,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            name: row.name,
            domain: row.domain,
            expected: row.expected,
            expected_status: row.expected_status,
            interval: row.check_interval,
            method: row.method,
            port: row.port,
            created_at: row.created_at,
            online: false,
            latency: 0.0,
            online_24_hours: 0.0,
            avg_response: String::new(),
            total_uptime: String::new(),
            data: String::new(),
            failures: Vec::new(),
        }
    }
}
