//! # Prometheus Metrics
//!
//! Operational metrics for the gateway, scraped at `/metrics` on the
//! metrics port. Everything lives in a dedicated [`prometheus::Registry`]
//! under the `rosetta` namespace.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    /// Requests served, labelled by endpoint path.
    pub requests_total: IntCounterVec,
    /// Rosetta errors returned, labelled by endpoint and catalog code.
    pub errors_total: IntCounterVec,
    /// Time spent fetching and decoding one block, in seconds.
    pub block_decode_seconds: Histogram,
}

impl GatewayMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("rosetta".into()), None)?;

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Rosetta requests served, by endpoint"),
            &["endpoint"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let errors_total = IntCounterVec::new(
            Opts::new("errors_total", "Rosetta errors returned, by endpoint and code"),
            &["endpoint", "code"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let block_decode_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "block_decode_seconds",
                "Latency of fetching and decoding a block into operations",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
        )?;
        registry.register(Box::new(block_decode_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            errors_total,
            block_decode_seconds,
        })
    }

    pub fn record_request(&self, endpoint: &str) {
        self.requests_total.with_label_values(&[endpoint]).inc();
    }

    pub fn record_error(&self, endpoint: &str, code: i32) {
        self.errors_total
            .with_label_values(&[endpoint, &code.to_string()])
            .inc();
    }

    /// Encodes all registered metrics into the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<GatewayMetrics>;

/// Renders `/metrics` in the Prometheus text format.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_namespaced_counters() {
        let metrics = GatewayMetrics::new().unwrap();
        metrics.record_request("/block");
        metrics.record_request("/block");
        metrics.record_error("/block", 12);
        metrics.block_decode_seconds.observe(0.002);

        let text = metrics.encode().unwrap();
        assert!(text.contains("rosetta_requests_total{endpoint=\"/block\"} 2"));
        let error_line = text
            .lines()
            .find(|l| l.starts_with("rosetta_errors_total{"))
            .unwrap();
        assert!(error_line.contains("code=\"12\""));
        assert!(error_line.ends_with(" 1"));
        assert!(text.contains("rosetta_block_decode_seconds_count 1"));
    }

    #[test]
    fn registries_are_independent() {
        let a = GatewayMetrics::new().unwrap();
        let b = GatewayMetrics::new().unwrap();
        a.record_request("/network/list");
        assert!(!b.encode().unwrap().contains("network/list"));
    }
}
