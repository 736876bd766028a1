//! Dashboard summary built from one exposition snapshot
//!
//! Pure transform from text to [`MetricsSummary`]: no caching, no I/O, safe
//! to call concurrently. Every rate is `0` when its denominator is `0`.

use serde::{Deserialize, Serialize};

use crate::stats::endpoints::StatusClass;
use crate::stats::names::*;
use crate::stats::query::{
    distinct_label_values, percentage, saturating_add, sum_where_label, unlabeled_value, value_of,
};
use crate::stats::sample::{parse_exposition, MetricSample};

/// Default number of backend errors at which a backend is reported unhealthy
pub const DEFAULT_UNHEALTHY_ERROR_THRESHOLD: f64 = 5.0;

/// Which `gateway_requests_total` series feeds `totalRequests`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalRequestsPolicy {
    /// Use the unlabeled aggregate line; sum labeled variants only when it
    /// is missing
    #[default]
    PreferUnlabeled,
    /// Sum labeled variants; use the unlabeled line only when no labeled
    /// variant exists
    SumLabeled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    /// A backend with at least this many errors is unhealthy
    pub unhealthy_error_threshold: f64,
    pub total_requests: TotalRequestsPolicy,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            unhealthy_error_threshold: DEFAULT_UNHEALTHY_ERROR_THRESHOLD,
            total_requests: TotalRequestsPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHealth {
    pub url: String,
    pub healthy: bool,
    pub error_count: f64,
    /// Milliseconds; absent when the gateway reports no positive latency
    #[serde(rename = "latency", default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCodes {
    #[serde(rename = "2xx")]
    pub success: f64,
    #[serde(rename = "4xx")]
    pub client_error: f64,
    #[serde(rename = "5xx")]
    pub server_error: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_requests: f64,
    /// Always `0`: a single snapshot carries no rate information
    pub request_rate: f64,
    pub active_connections: f64,
    pub auth_success_rate: f64,
    pub cache_hit_rate: f64,
    pub status_codes: StatusCodes,
    pub backends: Vec<BackendHealth>,
}

/// Parse `text` and build the dashboard summary
pub fn build_summary(text: &str, options: &SummaryOptions) -> MetricsSummary {
    summarize(&parse_exposition(text).samples, options)
}

/// Build the dashboard summary from already-parsed samples
pub fn summarize(samples: &[MetricSample], options: &SummaryOptions) -> MetricsSummary {
    let auth_success = value_of(samples, AUTH_SUCCESS_TOTAL, &[]);
    let auth_failure = first_present(samples, &[AUTH_FAILURE_TOTAL, AUTH_FAILURES_TOTAL]);

    let cache_hits = value_of(samples, CACHE_HITS_TOTAL, &[]);
    let cache_misses = value_of(samples, CACHE_MISSES_TOTAL, &[]);

    MetricsSummary {
        total_requests: total_requests(samples, options.total_requests),
        request_rate: 0.0,
        active_connections: value_of(samples, ACTIVE_CONNECTIONS, &[]),
        auth_success_rate: percentage(auth_success, saturating_add(auth_success, auth_failure)),
        cache_hit_rate: percentage(cache_hits, saturating_add(cache_hits, cache_misses)),
        status_codes: status_codes(samples),
        backends: backend_health(samples, options.unhealthy_error_threshold),
    }
}

fn total_requests(samples: &[MetricSample], policy: TotalRequestsPolicy) -> f64 {
    let unlabeled = unlabeled_value(samples, REQUESTS_TOTAL);
    let labeled: Vec<f64> = samples
        .iter()
        .filter(|s| s.name == REQUESTS_TOTAL && !s.labels.is_empty())
        .map(|s| s.value)
        .collect();
    let labeled_sum =
        (!labeled.is_empty()).then(|| labeled.iter().copied().fold(0.0, saturating_add));

    match policy {
        TotalRequestsPolicy::PreferUnlabeled => unlabeled.or(labeled_sum),
        TotalRequestsPolicy::SumLabeled => labeled_sum.or(unlabeled),
    }
    .unwrap_or(0.0)
}

/// Value of the first metric name in `names` that appears in the dump
fn first_present(samples: &[MetricSample], names: &[&str]) -> f64 {
    names
        .iter()
        .find(|name| samples.iter().any(|s| s.name == **name))
        .map_or(0.0, |name| value_of(samples, name, &[]))
}

/// Status-class totals from the first request counter family that carries a
/// status label
fn status_codes(samples: &[MetricSample]) -> StatusCodes {
    const SOURCES: [(&str, &str); 3] = [
        (REQUESTS_TOTAL, LABEL_STATUS),
        (HTTP_REQUESTS_TOTAL, LABEL_STATUS),
        (STATUS_CODES_TOTAL, LABEL_CODE),
    ];

    let Some((name, key)) = SOURCES
        .into_iter()
        .find(|(name, key)| samples.iter().any(|s| s.name == *name && s.labels.contains_key(*key)))
    else {
        return StatusCodes::default();
    };

    let class_total = |class: StatusClass| {
        sum_where_label(samples, name, key, |status| StatusClass::from_label(status) == Some(class))
    };

    StatusCodes {
        success: class_total(StatusClass::Success),
        client_error: class_total(StatusClass::ClientError),
        server_error: class_total(StatusClass::ServerError),
    }
}

fn backend_health(samples: &[MetricSample], threshold: f64) -> Vec<BackendHealth> {
    distinct_label_values(samples, BACKEND_ERRORS_TOTAL, LABEL_BACKEND)
        .into_iter()
        .map(|url| {
            let labels = [(LABEL_BACKEND, url.as_str())];
            let error_count = value_of(samples, BACKEND_ERRORS_TOTAL, &labels);
            let latency_ms = positive(value_of(samples, BACKEND_LATENCY_SECONDS, &labels))
                .map(|seconds| seconds * 1000.0)
                .or_else(|| positive(value_of(samples, BACKEND_LATENCY_MS, &labels)));

            BackendHealth {
                healthy: error_count < threshold,
                error_count,
                latency_ms,
                url,
            }
        })
        .collect()
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}
