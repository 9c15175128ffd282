//! Hit and failure row models (append-only).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uptime_core::service::{Failure, Hit};
use uptime_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Hits
// ---------------------------------------------------------------------------

/// A row from the `hits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HitRow {
    pub id: DbId,
    pub service_id: DbId,
    pub latency: f64,
    pub created_at: Timestamp,
}

/// DTO for recording a successful probe.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateHit {
    pub service_id: DbId,
    /// Latency in seconds.
    pub latency: f64,
    /// Defaults to `NOW()` when `None`.
    pub recorded_at: Option<Timestamp>,
}

impl From<HitRow> for Hit {
    fn from(row: HitRow) -> Self {
        Hit {
            id: row.id,
            service_id: row.service_id,
            latency: row.latency,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// A row from the `failures` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FailureRow {
    pub id: DbId,
    pub service_id: DbId,
    pub issue: String,
    pub created_at: Timestamp,
}

/// DTO for recording an unsuccessful probe.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFailure {
    pub service_id: DbId,
    pub issue: String,
    /// Defaults to `NOW()` when `None`.
    pub recorded_at: Option<Timestamp>,
}

impl From<FailureRow> for Failure {
    fn from(row: FailureRow) -> Self {
        Failure {
            id: row.id,
            service_id: row.service_id,
            issue: row.issue,
            created_at: row.created_at,
        }
    }
}
