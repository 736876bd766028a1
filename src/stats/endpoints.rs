//! Per-endpoint request aggregation
//!
//! Groups `gateway_requests_total{path,status}` samples by path and splits
//! them by status class. Labels are looked up by key, so the order the
//! gateway writes them in does not matter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::stats::names::{LABEL_PATH, LABEL_STATUS, REQUESTS_TOTAL};
use crate::stats::query::{percentage, saturating_add};
use crate::stats::sample::{parse_exposition, MetricSample};

/// HTTP status classes tracked by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    ClientError,
    ServerError,
}

impl StatusClass {
    /// Class for a numeric status; codes outside `[200, 600)` and the 3xx
    /// range have no class
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            200..=299 => Some(Self::Success),
            400..=499 => Some(Self::ClientError),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }

    /// Class for a status label value such as `"404"`
    pub fn from_label(value: &str) -> Option<Self> {
        value.trim().parse().ok().and_then(Self::from_code)
    }
}

/// Request totals for one path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    #[serde(rename = "endpoint")]
    pub path: String,
    #[serde(rename = "total_requests")]
    pub total: f64,
    #[serde(rename = "status_2xx")]
    pub success_2xx: f64,
    #[serde(rename = "status_4xx")]
    pub client_error_4xx: f64,
    #[serde(rename = "status_5xx")]
    pub server_error_5xx: f64,
    /// Percentage of 4xx + 5xx over total, `0` for an empty total
    pub error_rate: f64,
}

impl EndpointStats {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            total: 0.0,
            success_2xx: 0.0,
            client_error_4xx: 0.0,
            server_error_5xx: 0.0,
            error_rate: 0.0,
        }
    }

    fn add(&mut self, class: Option<StatusClass>, count: f64) {
        self.total = saturating_add(self.total, count);
        let bucket = match class {
            Some(StatusClass::Success) => &mut self.success_2xx,
            Some(StatusClass::ClientError) => &mut self.client_error_4xx,
            Some(StatusClass::ServerError) => &mut self.server_error_5xx,
            None => return,
        };
        *bucket = saturating_add(*bucket, count);
    }
}

/// Parse `text` and aggregate request counters per endpoint
pub fn aggregate_endpoints(text: &str) -> Vec<EndpointStats> {
    aggregate_endpoint_samples(&parse_exposition(text).samples)
}

/// Aggregate already-parsed samples per endpoint, busiest first
///
/// Ties keep the order in which paths first appeared.
pub fn aggregate_endpoint_samples(samples: &[MetricSample]) -> Vec<EndpointStats> {
    let mut stats: Vec<EndpointStats> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples.iter().filter(|s| s.name == REQUESTS_TOTAL) {
        let (Some(path), Some(status)) = (sample.label(LABEL_PATH), sample.label(LABEL_STATUS))
        else {
            continue;
        };

        let Ok(code) = status.trim().parse::<i64>() else {
            debug!(path, status, "Ignoring request sample with non-numeric status");
            continue;
        };

        let slot = *index.entry(path).or_insert_with(|| {
            stats.push(EndpointStats::new(path));
            stats.len() - 1
        });
        stats[slot].add(StatusClass::from_code(code), sample.value);
    }

    for endpoint in &mut stats {
        endpoint.error_rate = percentage(
            saturating_add(endpoint.client_error_4xx, endpoint.server_error_5xx),
            endpoint.total,
        );
    }

    stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    stats
}
