//! Metrics collection and exposition.
//!
//! # Metrics
//! - `crud_requests_total` (counter): dispatched requests by method, route, status
//! - `crud_request_duration_seconds` (histogram): pipeline latency by route
//! - `crud_forwarded_total` (counter): primary → worker forwards by worker, status
//! - `crud_store_operations_total` (counter): store operations by kind, outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Only the externally visible process installs the Prometheus listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    ::metrics::counter!(
        "crud_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("crud_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one request forwarded by the primary.
pub fn record_forward(worker: &str, status: u16) {
    ::metrics::counter!(
        "crud_forwarded_total",
        "worker" => worker.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record one store operation.
pub fn record_store_op(kind: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!("crud_store_operations_total", "kind" => kind, "outcome" => outcome)
        .increment(1);
}
