//! Dashboard metrics endpoints
//!
//! - `GET /api/metrics` - raw exposition text, passed through
//! - `GET /api/metrics/summary` - [`MetricsSummary`] JSON
//! - `GET /api/logs` - per-endpoint request stats
//! - `GET /metrics` - the console's own metrics, not the gateway's

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers::ConsoleState;
use crate::metrics::record_skipped_lines;
use crate::stats::{
    aggregate_endpoint_samples, parse_exposition, summarize, EndpointStats, MetricsSummary,
};

/// GET /api/metrics
pub async fn get_raw_metrics(
    State(state): State<ConsoleState>,
) -> Result<impl IntoResponse, AppError> {
    let text = state.gateway().fetch_metrics().await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// GET /api/metrics/summary
///
/// An all-zero summary is a valid 200 response; fetch failures come back as
/// an error body instead.
pub async fn get_summary(
    State(state): State<ConsoleState>,
) -> Result<Json<MetricsSummary>, AppError> {
    let text = state.gateway().fetch_metrics().await?;

    let exposition = parse_exposition(&text);
    record_skipped_lines("summary", exposition.skipped);

    Ok(Json(summarize(&exposition.samples, &state.summary_options())))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointsResponse {
    pub endpoints: Vec<EndpointStats>,
    /// RFC 3339 time the snapshot was taken
    pub timestamp: String,
}

/// GET /api/logs
pub async fn get_endpoints(
    State(state): State<ConsoleState>,
) -> Result<Json<EndpointsResponse>, AppError> {
    let text = state.gateway().fetch_metrics().await?;

    let exposition = parse_exposition(&text);
    record_skipped_lines("endpoints", exposition.skipped);

    Ok(Json(EndpointsResponse {
        endpoints: aggregate_endpoint_samples(&exposition.samples),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /metrics
pub async fn console_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[tokio::test]
    async fn test_console_metrics_renders_local_recorder() {
        // Local recorder; the global one is never installed in tests
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = Arc::new(recorder.handle());
        metrics::with_local_recorder(&recorder, || record_skipped_lines("summary", 2));

        let response = console_metrics(State(handle)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("console_exposition_skipped_lines_total{view=\"summary\"} 2"));
    }

    #[test]
    fn test_endpoints_response_shape() {
        let response = EndpointsResponse {
            endpoints: Vec::new(),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["endpoints"], serde_json::json!([]));
        assert_eq!(json["timestamp"], "2026-01-01T00:00:00+00:00");
    }
}
