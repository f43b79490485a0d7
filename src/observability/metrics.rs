//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_resolutions_total` (counter): lookups by method and outcome
//! - `gate_request_duration_seconds` (histogram): latency by route, status
//! - `gate_reloads_total` (counter): registry reloads by trigger
//! - `gate_registry_entries` (gauge): clients per registry

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(method: &'static str, outcome: &'static str) {
    counter!("gate_resolutions_total", "method" => method, "outcome" => outcome).increment(1);
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    histogram!(
        "gate_request_duration_seconds",
        "route" => route,
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_reload(trigger: &'static str) {
    counter!("gate_reloads_total", "trigger" => trigger).increment(1);
}

pub fn record_registry_size(registry: &'static str, entries: usize) {
    gauge!("gate_registry_entries", "registry" => registry).set(entries as f64);
}
