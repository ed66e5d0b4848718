//! Metrics collection.
//!
//! # Metrics
//! - `switchyard_requests_total` (counter): completed requests by status
//! - `switchyard_request_duration_seconds` (histogram): handling latency
//! - `switchyard_route_misses_total` (counter): requests no route matched
//! - `switchyard_sessions_created_total` (counter): sessions given an id
//! - `switchyard_sessions_expired_total` (counter): sessions removed by expiry
//! - `switchyard_sessions_active` (gauge): sessions currently stored
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exposition is left to the host
//! - Status is the only label, to keep cardinality bounded

use std::time::Duration;

use http::StatusCode;

pub fn record_request(status: StatusCode, elapsed: Duration) {
    metrics::counter!("switchyard_requests_total", "status" => status.as_u16().to_string())
        .increment(1);
    metrics::histogram!("switchyard_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_route_miss() {
    metrics::counter!("switchyard_route_misses_total").increment(1);
}

pub fn record_session_created() {
    metrics::counter!("switchyard_sessions_created_total").increment(1);
}

pub fn record_sessions_expired(count: usize) {
    if count > 0 {
        metrics::counter!("switchyard_sessions_expired_total").increment(count as u64);
    }
}

pub fn set_sessions_active(count: usize) {
    metrics::gauge!("switchyard_sessions_active").set(count as f64);
}
