//! Monitored service entity and its observation records.
//!
//! A [`Service`] carries two kinds of data:
//! - static attributes loaded from the `services` table, and
//! - derived statistics (`online`, `latency`, `online_24_hours`,
//!   `avg_response`, `total_uptime`, `data`) filled in by
//!   [`crate::uptime::enrich`].
//!
//! Derived fields are a cache over the hit/failure history. They are never
//! written back to storage.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// A monitored endpoint with its derived health statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: DbId,
    pub name: String,
    pub domain: String,
    /// Substring the probe expects to find in the response body.
    pub expected: String,
    pub expected_status: i32,
    /// Poll interval in seconds.
    pub interval: i32,
    pub method: String,
    pub port: i32,
    pub created_at: Timestamp,

    /// True when the most recent observation is a hit.
    #[serde(default)]
    pub online: bool,
    /// Latency of the most recent hit, in seconds.
    #[serde(default)]
    pub latency: f64,
    /// Uptime percentage over the last 24 hours.
    #[serde(default)]
    pub online_24_hours: f64,
    #[serde(default)]
    pub avg_response: String,
    #[serde(default)]
    pub total_uptime: String,
    /// Serialized time series of hit latencies (JSON array of graph points).
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub failures: Vec<Failure>,
}

impl Service {
    /// Build a service shell from its static attributes.
    ///
    /// Derived fields start empty until the first enrichment pass.
    pub fn from_create(id: DbId, created_at: Timestamp, input: &CreateService) -> Self {
        Self {
            id,
            name: input.name.clone(),
            domain: input.domain.clone(),
            expected: input.expected.clone(),
            expected_status: input.expected_status,
            interval: input.interval,
            method: input.method.clone(),
            port: input.port,
            created_at,
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

/// DTO for registering a new service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateService {
    pub name: String,
    pub domain: String,
    pub expected: String,
    pub expected_status: i32,
    pub interval: i32,
    pub method: String,
    pub port: i32,
}

// ---------------------------------------------------------------------------
// Observations (append-only)
// ---------------------------------------------------------------------------

/// A successful probe with its measured latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub id: DbId,
    pub service_id: DbId,
    /// Round-trip latency in seconds.
    pub latency: f64,
    pub created_at: Timestamp,
}

/// An unsuccessful probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub id: DbId,
    pub service_id: DbId,
    pub issue: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_input() -> CreateService {
        CreateService {
            name: "Example".to_string(),
            domain: "https://example.com".to_string(),
            expected: "ok".to_string(),
            expected_status: 200,
            interval: 30,
            method: "GET".to_string(),
            port: 443,
        }
    }

    #[test]
    fn from_create_copies_static_attributes() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let service = Service::from_create(7, created_at, &create_input());

        assert_eq!(service.id, 7);
        assert_eq!(service.name, "Example");
        assert_eq!(service.domain, "https://example.com");
        assert_eq!(service.expected_status, 200);
        assert_eq!(service.interval, 30);
        assert_eq!(service.port, 443);
        assert_eq!(service.created_at, created_at);
    }

    #[test]
    fn from_create_leaves_derived_fields_empty() {
        let service = Service::from_create(1, Utc::now(), &create_input());

        assert!(!service.online);
        assert_eq!(service.latency, 0.0);
        assert_eq!(service.online_24_hours, 0.0);
        assert!(service.avg_response.is_empty());
        assert!(service.total_uptime.is_empty());
        assert!(service.data.is_empty());
        assert!(service.failures.is_empty());
    }

    #[test]
    fn service_serializes_derived_fields() {
        let mut service = Service::from_create(3, Utc::now(), &create_input());
        service.total_uptime = "99.50".to_string();
        service.online = true;

        let json = serde_json::to_value(&service).expect("serialization should succeed");
        assert_eq!(json["id"], 3);
        assert_eq!(json["total_uptime"], "99.50");
        assert_eq!(json["online"], true);
        assert!(json["failures"].is_array());
    }
}
