//! Metric names and label keys published by the gateway
//!
//! Shared by the summary builder (consumer) and the mock gateway (producer)
//! so both sides agree on the exposition vocabulary.

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const HTTP_REQUESTS_TOTAL: &str = "gateway_http_requests_total";
pub const STATUS_CODES_TOTAL: &str = "gateway_status_codes_total";

pub const ACTIVE_CONNECTIONS: &str = "gateway_active_connections";
pub const TOTAL_CONNECTIONS: &str = "gateway_total_connections";

pub const AUTH_SUCCESS_TOTAL: &str = "gateway_auth_success_total";
pub const AUTH_FAILURE_TOTAL: &str = "gateway_auth_failure_total";
/// Spelling emitted by older gateway builds
pub const AUTH_FAILURES_TOTAL: &str = "gateway_auth_failures_total";

pub const CACHE_HITS_TOTAL: &str = "gateway_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "gateway_cache_misses_total";

pub const RATE_LIMIT_HITS_TOTAL: &str = "gateway_rate_limit_hits_total";
pub const RATE_LIMIT_ALLOWED_TOTAL: &str = "gateway_rate_limit_allowed_total";

pub const BACKEND_ERRORS_TOTAL: &str = "gateway_backend_errors_total";
pub const BACKEND_LATENCY_SECONDS: &str = "gateway_backend_latency_seconds";
pub const BACKEND_LATENCY_MS: &str = "gateway_backend_latency_ms";

pub const LABEL_PATH: &str = "path";
pub const LABEL_STATUS: &str = "status";
pub const LABEL_METHOD: &str = "method";
pub const LABEL_CODE: &str = "code";
pub const LABEL_BACKEND: &str = "backend";
