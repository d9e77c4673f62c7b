//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): forwarded requests by upstream status
//! - `guard_rejections_total` (counter): rejected requests by channel
//!
//! # Design Decisions
//! - Recording helpers are no-ops until the exporter is installed
//! - Labels are low-cardinality (channel name, status code)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exposition endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics endpoint started");
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to start metrics endpoint");
        }
    }
}

/// Record a request forwarded to the upstream, by response status.
pub fn record_forwarded(status: u16) {
    metrics::counter!("guard_requests_total", "status" => status.to_string()).increment(1);
}

/// Record a request rejected by the filter, by offending channel.
pub fn record_rejection(channel: &'static str) {
    metrics::counter!("guard_rejections_total", "channel" => channel).increment(1);
}
