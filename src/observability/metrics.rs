//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, status
//! - `router_request_duration_seconds` (histogram): dispatch latency
//! - `router_unmatched_total` (counter): synthesized failures by status
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Status codes as labels, never resources (unbounded cardinality)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram, Label};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_dispatch(method: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("status", status.to_string()),
    ];
    counter!("router_requests_total", labels.clone()).increment(1);
    histogram!("router_request_duration_seconds", labels).record(start.elapsed().as_secs_f64());
}

/// Record a request no route responded to.
pub fn record_unmatched(status: u16) {
    counter!("router_unmatched_total", "status" => status.to_string()).increment(1);
}
