//! The console's own Prometheus metrics
//!
//! Separate from the gateway metrics the console parses: these describe the
//! console itself (upstream fetches, dropped exposition lines).

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and describe console metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Describe console metrics (safe to call more than once)
fn init_metric_descriptions() {
    describe_counter!(
        "console_upstream_requests_total",
        "Requests made from the console to the gateway, by endpoint and outcome"
    );
    describe_histogram!(
        "console_upstream_request_duration_seconds",
        "Duration of console requests to the gateway"
    );
    describe_counter!(
        "console_exposition_skipped_lines_total",
        "Malformed exposition lines dropped while parsing gateway metrics"
    );
    describe_gauge!(
        "console_info",
        "Console version information"
    );

    gauge!("console_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one request to the gateway
pub fn record_upstream_request(endpoint: &str, outcome: &str, duration: Duration) {
    counter!(
        "console_upstream_requests_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);

    histogram!(
        "console_upstream_request_duration_seconds",
        "endpoint" => endpoint.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record exposition lines dropped by the parser
pub fn record_skipped_lines(view: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(
        "console_exposition_skipped_lines_total",
        "view" => view.to_string(),
    )
    .increment(count as u64);
}
