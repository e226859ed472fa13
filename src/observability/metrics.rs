//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by backend, status
//! - `gateway_request_duration_seconds` (histogram): latency by backend
//! - `gateway_classification_failures_total` (counter): by failure kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("gateway_requests_total", "Requests handled, by backend and status");
    describe_histogram!(
        "gateway_request_duration_seconds",
        "Time from receipt to upstream response, by backend"
    );
    describe_counter!(
        "gateway_classification_failures_total",
        "Requests no backend could be chosen for, by kind"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(backend: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that failed classification.
pub fn record_classification_failure(kind: &'static str) {
    counter!("gateway_classification_failures_total", "kind" => kind).increment(1);
}
