//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active WebSocket connection gauges
//! - Group and direct message outcomes (persisted, rejected, failed)
//! - Fan-out deliveries to room subscribers

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

const NAMESPACE: &str = "edu_social";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace(NAMESPACE),
        &["state"], // "connected", "authenticated"
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Group message counter by outcome
pub static GROUP_MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("group_messages_total", "Group messages handled by outcome").namespace(NAMESPACE),
        &["outcome"], // "persisted", "rejected", "failed"
    )
    .expect("Failed to create GROUP_MESSAGES_TOTAL metric")
});

/// Direct message counter by outcome
pub static DIRECT_MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("direct_messages_total", "Direct messages handled by outcome").namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("Failed to create DIRECT_MESSAGES_TOTAL metric")
});

/// Frames handed to room subscribers
pub static FANOUT_DELIVERIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "fanout_deliveries_total",
            "Frames delivered to room subscribers",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create FANOUT_DELIVERIES_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(GROUP_MESSAGES_TOTAL.clone()))
        .expect("Failed to register GROUP_MESSAGES_TOTAL");
    registry
        .register(Box::new(DIRECT_MESSAGES_TOTAL.clone()))
        .expect("Failed to register DIRECT_MESSAGES_TOTAL");
    registry
        .register(Box::new(FANOUT_DELIVERIES_TOTAL.clone()))
        .expect("Failed to register FANOUT_DELIVERIES_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// A socket finished its upgrade
pub fn websocket_opened() {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["connected"])
        .inc();
}

/// A socket passed the Auth Gate
pub fn websocket_authenticated() {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["authenticated"])
        .inc();
}

/// A socket closed; `authenticated` must match whether it passed the Auth Gate
pub fn websocket_closed(authenticated: bool) {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["connected"])
        .dec();
    if authenticated {
        WEBSOCKET_CONNECTIONS_ACTIVE
            .with_label_values(&["authenticated"])
            .dec();
    }
}

/// Count a group message outcome
pub fn record_group_message(outcome: &str) {
    GROUP_MESSAGES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Count a direct message outcome
pub fn record_direct_message(outcome: &str) {
    DIRECT_MESSAGES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Count frames handed to subscribers by one fan-out
pub fn record_fanout(delivered: usize) {
    FANOUT_DELIVERIES_TOTAL.inc_by(delivered as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("edu_social_http_requests_total"));
    }

    #[test]
    fn test_group_message_outcomes_are_exported() {
        record_group_message("rejected");
        record_fanout(3);

        let metrics = gather_metrics();
        assert!(metrics.contains("edu_social_group_messages_total{outcome=\"rejected\"}"));
        assert!(metrics.contains("edu_social_fanout_deliveries_total"));
    }

    #[test]
    fn test_direct_message_outcomes_are_exported() {
        record_direct_message("persisted");

        let metrics = gather_metrics();
        assert!(metrics.contains("edu_social_direct_messages_total{outcome=\"persisted\"}"));
    }
}
