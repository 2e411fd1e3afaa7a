//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): gated requests by outcome
//!   (`allowed`, `denied`, `exempt`)
//! - `gate_rate_limited_total` (counter): denials emitted as 429
//! - `gate_unidentified_client_total` (counter): requests bucketed under the
//!   shared fallback key; signals reduced limiting granularity
//! - `gate_tracked_keys` (gauge): client keys currently held by the limiter

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::error!(error = %e, "Failed to install metrics exporter");
    } else {
        tracing::info!(address = %addr, "Metrics exporter listening");
    }
}

pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("gate_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited() {
    metrics::counter!("gate_rate_limited_total").increment(1);
}

pub fn record_unidentified_client() {
    metrics::counter!("gate_unidentified_client_total").increment(1);
}

pub fn record_tracked_keys(count: usize) {
    metrics::gauge!("gate_tracked_keys").set(count as f64);
}
