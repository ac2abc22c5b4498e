//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_admission_rejections_total` (counter): gate rejections by reason
//! - `gateway_upstream_requests_total` (counter): upstream fetches by outcome
//! - `gateway_rate_windows` (gauge): live rate-limit windows

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed HTTP request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record an admission gate rejection by reason code.
pub fn record_rejected(reason: &'static str) {
    metrics::counter!("gateway_admission_rejections_total", "reason" => reason).increment(1);
}

/// Record an upstream signal fetch outcome.
pub fn record_upstream(outcome: &'static str) {
    metrics::counter!("gateway_upstream_requests_total", "outcome" => outcome).increment(1);
}

/// Track the number of live rate-limit windows.
pub fn record_window_count(count: usize) {
    metrics::gauge!("gateway_rate_windows").set(count as f64);
}
