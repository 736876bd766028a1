//! Counter state behind the mock gateway's `/metrics`
//!
//! Owned by whoever emits the exposition text and passed around explicitly
//! (`Arc<GatewayCounters>`); nothing here is process-global.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::stats::names::*;

/// Weight of the previous value in the backend latency moving average
const LATENCY_DECAY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RequestKey {
    method: String,
    path: String,
    status: u16,
}

#[derive(Debug, Default)]
struct Series {
    requests: BTreeMap<RequestKey, u64>,
    backend_errors: BTreeMap<String, u64>,
    /// Seconds
    backend_latency: BTreeMap<String, f64>,
}

#[derive(Debug, Default)]
pub struct GatewayCounters {
    total_requests: AtomicU64,
    active_connections: AtomicU64,
    total_connections: AtomicU64,
    auth_success: AtomicU64,
    auth_failure: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    rate_limit_hits: AtomicU64,
    rate_limit_allowed: AtomicU64,
    series: Mutex<Series>,
}

impl GatewayCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn series(&self) -> MutexGuard<'_, Series> {
        self.series.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_request(&self, method: &str, path: &str, status: u16) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let key = RequestKey {
            method: method.to_string(),
            path: path.to_string(),
            status,
        };
        *self.series().requests.entry(key).or_insert(0) += 1;
    }

    pub fn record_auth(&self, success: bool) {
        let counter = if success { &self.auth_success } else { &self.auth_failure };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache(&self, hit: bool) {
        let counter = if hit { &self.cache_hits } else { &self.cache_misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limit(&self, allowed: bool) {
        let counter = if allowed { &self.rate_limit_allowed } else { &self.rate_limit_hits };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Make a backend visible with zero errors
    pub fn register_backend(&self, backend: &str) {
        self.series()
            .backend_errors
            .entry(backend.to_string())
            .or_insert(0);
    }

    pub fn record_backend_error(&self, backend: &str) {
        *self
            .series()
            .backend_errors
            .entry(backend.to_string())
            .or_insert(0) += 1;
    }

    /// Fold a latency observation into the backend's moving average
    pub fn record_backend_latency(&self, backend: &str, seconds: f64) {
        self.series()
            .backend_latency
            .entry(backend.to_string())
            .and_modify(|avg| *avg = *avg * LATENCY_DECAY + seconds * (1.0 - LATENCY_DECAY))
            .or_insert(seconds);
    }

    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// `(hits, misses)`
    pub fn cache_totals(&self) -> (u64, u64) {
        (
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
        )
    }

    pub fn reset_cache(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }

    pub fn reset_rate_limits(&self) {
        self.rate_limit_hits.store(0, Ordering::Relaxed);
        self.rate_limit_allowed.store(0, Ordering::Relaxed);
    }

    /// Render the current values as exposition text
    pub fn render(&self) -> String {
        let mut out = String::new();

        family(&mut out, REQUESTS_TOTAL, "Total number of requests", "counter");
        out.push_str(&format!("{} {}\n", REQUESTS_TOTAL, self.total_requests()));
        let series = self.series();
        for (key, count) in &series.requests {
            out.push_str(&format!(
                "{}{{{}=\"{}\",{}=\"{}\",{}=\"{}\"}} {}\n",
                REQUESTS_TOTAL,
                LABEL_METHOD,
                key.method,
                LABEL_PATH,
                key.path,
                LABEL_STATUS,
                key.status,
                count
            ));
        }

        let scalars: [(&str, &str, &str, &AtomicU64); 8] = [
            (
                ACTIVE_CONNECTIONS,
                "Current active connections",
                "gauge",
                &self.active_connections,
            ),
            (
                TOTAL_CONNECTIONS,
                "Total connections handled",
                "counter",
                &self.total_connections,
            ),
            (AUTH_SUCCESS_TOTAL, "Successful authentications", "counter", &self.auth_success),
            (AUTH_FAILURE_TOTAL, "Failed authentications", "counter", &self.auth_failure),
            (CACHE_HITS_TOTAL, "Cache hits", "counter", &self.cache_hits),
            (CACHE_MISSES_TOTAL, "Cache misses", "counter", &self.cache_misses),
            (
                RATE_LIMIT_HITS_TOTAL,
                "Requests rejected by rate limiting",
                "counter",
                &self.rate_limit_hits,
            ),
            (
                RATE_LIMIT_ALLOWED_TOTAL,
                "Requests allowed by rate limiting",
                "counter",
                &self.rate_limit_allowed,
            ),
        ];
        for (name, help, kind, value) in scalars {
            family(&mut out, name, help, kind);
            out.push_str(&format!("{} {}\n", name, value.load(Ordering::Relaxed)));
        }

        if !series.backend_errors.is_empty() {
            family(&mut out, BACKEND_ERRORS_TOTAL, "Backend errors by backend", "counter");
            for (backend, count) in &series.backend_errors {
                out.push_str(&format!(
                    "{}{{{}=\"{}\"}} {}\n",
                    BACKEND_ERRORS_TOTAL, LABEL_BACKEND, backend, count
                ));
            }
        }

        if !series.backend_latency.is_empty() {
            family(
                &mut out,
                BACKEND_LATENCY_SECONDS,
                "Average backend latency in seconds",
                "gauge",
            );
            for (backend, seconds) in &series.backend_latency {
                out.push_str(&format!(
                    "{}{{{}=\"{}\"}} {:.6}\n",
                    BACKEND_LATENCY_SECONDS, LABEL_BACKEND, backend, seconds
                ));
            }
        }

        out
    }
}

fn family(out: &mut String, name: &str, help: &str, kind: &str) {
    out.push_str(&format!("# HELP {} {}\n# TYPE {} {}\n", name, help, name, kind));
}
