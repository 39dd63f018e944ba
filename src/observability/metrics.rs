//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cf_fetch_attempts_total` (counter): attempts by route, outcome
//! - `cf_operations_total` (counter): logical operations by name, outcome
//! - `cf_operation_duration_seconds` (histogram): end-to-end operation latency
//! - `gate_decisions_total` (counter): gate outcomes by decision
//! - `http_requests_total` (counter): served requests by method, status
//! - `http_request_duration_seconds` (histogram): handler latency
//!
//! Updates go through the `metrics` facade and are no-ops until a recorder
//! is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_fetch_attempt(route: &str, outcome: &'static str) {
    counter!("cf_fetch_attempts_total", "route" => route.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_operation(operation: &str, outcome: &'static str, start: Instant) {
    counter!("cf_operations_total", "operation" => operation.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("cf_operation_duration_seconds", "operation" => operation.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_gate_decision(decision: &'static str) {
    counter!("gate_decisions_total", "decision" => decision).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!("http_requests_total", "method" => method.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
