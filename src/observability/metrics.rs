//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by pipeline, outcome
//! - `gateway_request_duration_seconds` (histogram): dispatch latency
//! - `gateway_reloads_total` (counter): reload attempts by result
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        // Already installed (e.g. in tests) or the port is taken
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(pipeline: &str, outcome: &'static str, start: Instant) {
    let pipeline = pipeline.to_string();
    counter!(
        "gateway_requests_total",
        "pipeline" => pipeline.clone(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "pipeline" => pipeline)
        .record(start.elapsed().as_secs_f64());
}

/// Record a configuration reload attempt.
pub fn record_reload(ok: bool) {
    let result = if ok { "success" } else { "failure" };
    counter!("gateway_reloads_total", "result" => result).increment(1);
}
