//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by backend, status
//! - `balancer_request_duration_seconds` (histogram): upstream latency
//! - `balancer_active_connections` (gauge): in-flight connections per backend
//! - `balancer_backend_health` (gauge): 1=alive, 0=dead
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! deployments without the exporter pay almost nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install Prometheus exporter"),
    }
}

/// Record a completed dispatch.
pub fn record_request(backend: &str, status: u16, start: Instant) {
    counter!(
        "balancer_requests_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("balancer_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Publish the current in-flight connection count of a backend.
pub fn set_active_connections(backend: &str, connections: usize) {
    gauge!("balancer_active_connections", "backend" => backend.to_string()).set(connections as f64);
}

pub fn record_backend_health(backend: &str, alive: bool) {
    gauge!("balancer_backend_health", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}

/// Count requests rejected because no backend was alive.
pub fn record_unavailable() {
    counter!("balancer_unavailable_total").increment(1);
}
