//! Uptime and latency statistics derived from hit/failure history.
//!
//! Every function here is pure: the same [`ObservationSnapshot`] always
//! yields the same [`DerivedStats`]. The catalog runs [`enrich`] whenever a
//! service is materialized, so results must be reproducible from the
//! append-only observation log alone.
//!
//! Rounding is half away from zero (`f64::round` on the scaled value):
//! percentages to 2 decimals, the average response string to 0 decimals.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::service::{Failure, Hit, Service};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the rolling uptime window.
pub const ROLLING_WINDOW_HOURS: i64 = 24;

/// Scale applied to the mean hit latency (seconds) for the average metric.
pub const AVERAGE_RESPONSE_SCALE: f64 = 100.0;

/// Extra scale applied when rendering the average metric as text.
pub const AVERAGE_RESPONSE_DISPLAY_SCALE: f64 = 10.0;

/// Seconds to milliseconds, for graph points.
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Literal shown for a service without a single recorded hit.
pub const UPTIME_NO_DATA: &str = "0";

/// Literal shown for a service that never failed.
pub const UPTIME_PERFECT: &str = "100.00";

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round `value` to `places` decimals, ties away from zero.
pub fn round_half_away(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Start of the rolling window ending at `now`.
pub fn window_start(now: Timestamp) -> Timestamp {
    now - Duration::hours(ROLLING_WINDOW_HOURS)
}

// ---------------------------------------------------------------------------
// Percentages
// ---------------------------------------------------------------------------

/// `100 - failures/total * 100`, clamped to `[0, 100]` and rounded.
///
/// Callers must rule out `total <= 0` first.
fn failure_adjusted_percent(failures: i64, total: i64) -> f64 {
    let percent = 100.0 - (failures as f64 / total as f64 * 100.0);
    round_half_away(percent.clamp(0.0, 100.0), 2)
}

/// Uptime percentage over the rolling window.
///
/// `total` is the number of recorded hits and `failures` the failures that
/// fall inside the window. A service with no hits reports `0.0` even when it
/// has no failures either.
pub fn rolling_uptime(failures: i64, total: i64) -> f64 {
    // Checked before the no-failures case: a service never probed reports 0.
    if total <= 0 {
        return 0.0;
    }
    if failures <= 0 {
        return 100.0;
    }
    failure_adjusted_percent(failures, total)
}

/// All-time uptime percentage, rendered with two decimals.
///
/// Keeps the `"0"` / `"100.00"` literals distinguishable from computed
/// values like `"0.00"`.
pub fn total_uptime(failures: i64, total: i64) -> String {
    // Same precedence as `rolling_uptime`: no hits wins over no failures.
    if total <= 0 {
        return UPTIME_NO_DATA.to_string();
    }
    if failures <= 0 {
        return UPTIME_PERFECT.to_string();
    }
    format!("{:.2}", failure_adjusted_percent(failures, total))
}

// ---------------------------------------------------------------------------
// Latency
// ---------------------------------------------------------------------------

/// Mean hit latency scaled by [`AVERAGE_RESPONSE_SCALE`].
///
/// Returns `0.0` when there are no hits.
pub fn average_response_time(sum_latency: f64, total_hits: i64) -> f64 {
    if total_hits <= 0 {
        return 0.0;
    }
    sum_latency / total_hits as f64 * AVERAGE_RESPONSE_SCALE
}

/// Presentation string for [`average_response_time`]: `avg * 10`, no decimals.
pub fn format_average_response(average: f64) -> String {
    let scaled = round_half_away(average * AVERAGE_RESPONSE_DISPLAY_SCALE, 0);
    if scaled == 0.0 {
        // Avoid rendering "-0".
        return "0".to_string();
    }
    format!("{scaled:.0}")
}

/// Latency of the newest hit in seconds, `0.0` without hits.
pub fn latest_latency(hits: &[Hit]) -> f64 {
    hits.iter()
        .max_by_key(|h| h.created_at)
        .map(|h| h.latency)
        .unwrap_or(0.0)
}

/// A service is online when its newest observation is a hit.
pub fn is_online(hits: &[Hit], failures: &[Failure]) -> bool {
    let last_hit = hits.iter().map(|h| h.created_at).max();
    let last_failure = failures.iter().map(|f| f.created_at).max();
    match (last_hit, last_failure) {
        (Some(hit), Some(failure)) => hit > failure,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// One point of the exported latency series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    /// Hit timestamp as text.
    pub x: String,
    /// Latency in milliseconds.
    pub y: f64,
}

/// Convert hits into graph points, preserving their order.
pub fn graph_points(hits: &[Hit]) -> Vec<GraphPoint> {
    hits.iter()
        .map(|h| GraphPoint {
            x: h.created_at.to_string(),
            y: h.latency * MILLIS_PER_SECOND,
        })
        .collect()
}

/// Serialize graph points to compact JSON. An empty series is `"[]"`.
pub fn graph_json(points: &[GraphPoint]) -> Result<String, CoreError> {
    Ok(serde_json::to_string(points)?)
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Accessor results for one service, gathered in a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSnapshot {
    pub total_hits: i64,
    pub sum_latency: f64,
    pub total_failures: i64,
    /// Failures inside the rolling window.
    pub failures_24h: i64,
    /// All hits, oldest first.
    pub hits: Vec<Hit>,
    /// All failures, oldest first.
    pub failures: Vec<Failure>,
}

impl ObservationSnapshot {
    /// Build a snapshot from raw history, counting the window relative to `now`.
    pub fn from_history(hits: Vec<Hit>, failures: Vec<Failure>, now: Timestamp) -> Self {
        let since = window_start(now);
        Self {
            total_hits: hits.len() as i64,
            sum_latency: hits.iter().map(|h| h.latency).sum(),
            total_failures: failures.len() as i64,
            failures_24h: failures.iter().filter(|f| f.created_at >= since).count() as i64,
            hits,
            failures,
        }
    }
}

/// The derived fields of a [`Service`].
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStats {
    pub online: bool,
    pub latency: f64,
    pub online_24_hours: f64,
    pub average_response: f64,
    pub avg_response: String,
    pub total_uptime: String,
    pub data: String,
}

impl DerivedStats {
    pub fn compute(snapshot: &ObservationSnapshot) -> Result<Self, CoreError> {
        let average_response = average_response_time(snapshot.sum_latency, snapshot.total_hits);
        let data = graph_json(&graph_points(&snapshot.hits))?;

        Ok(Self {
            online: is_online(&snapshot.hits, &snapshot.failures),
            latency: latest_latency(&snapshot.hits),
            online_24_hours: rolling_uptime(snapshot.failures_24h, snapshot.total_hits),
            average_response,
            avg_response: format_average_response(average_response),
            total_uptime: total_uptime(snapshot.total_failures, snapshot.total_hits),
            data,
        })
    }
}

/// Overwrite the derived fields of `service` from `snapshot`.
///
/// Also attaches the failure history. Running it twice on the same snapshot
/// leaves the service unchanged.
pub fn enrich(service: &mut Service, snapshot: &ObservationSnapshot) -> Result<(), CoreError> {
    let stats = DerivedStats::compute(snapshot)?;

    service.online = stats.online;
    service.latency = stats.latency;
    service.online_24_hours = stats.online_24_hours;
    service.avg_response = stats.avg_response;
    service.total_uptime = stats.total_uptime;
    service.data = stats.data;
    service.failures = snapshot.failures.clone();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
