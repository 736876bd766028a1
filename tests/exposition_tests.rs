/// Integration tests for the exposition engine against realistic gateway dumps
use gateway_console::stats::{
    aggregate_endpoints, build_summary, distinct_label_values, parse_exposition, sum_matching,
    value_of, NamePattern, SummaryOptions, TotalRequestsPolicy,
};

/// Dump in the shape the C++ gateway's simple exporter writes
const SIMPLE_EXPORTER_DUMP: &str = r#"# HELP gateway_http_requests_total Total HTTP requests
# TYPE gateway_http_requests_total counter
gateway_http_requests_total{method="GET",path="/api/users",status="200"} 40
gateway_http_requests_total{method="GET",path="/api/users",status="500"} 2
gateway_http_requests_total{method="POST",path="/api/login",status="401"} 6
# HELP gateway_auth_failures_total Authentication failures
# TYPE gateway_auth_failures_total counter
gateway_auth_failures_total 6
gateway_auth_success_total 42
gateway_backend_errors_total{backend="10.0.0.5:9000"} 2
gateway_backend_latency_ms{backend="10.0.0.5:9000"} 37.5
"#;

#[test]
fn test_malformed_lines_do_not_poison_snapshot() {
    let text = "\
gateway_active_connections 5
gateway_active_connections{ 3
{path=\"/x\"} 1
gateway_cache_hits_total abc
gateway_cache_hits_total 4 1700000000000
gateway_cache_misses_total 1 2 3
gateway_cache_misses_total 4
";
    let exposition = parse_exposition(text);
    assert_eq!(exposition.samples.len(), 3);
    assert_eq!(exposition.skipped, 4);

    let summary = build_summary(text, &SummaryOptions::default());
    assert_eq!(summary.active_connections, 5.0);
    assert_eq!(summary.cache_hit_rate, 50.0);
}

#[test]
fn test_non_finite_values_are_skipped() {
    let exposition = parse_exposition("a NaN\nb +Inf\nc -Inf\nd 1e3\ne 1e999\nf -1e400\n");
    assert_eq!(exposition.skipped, 5);
    assert_eq!(exposition.samples.len(), 1);
    assert_eq!(exposition.samples[0].value, 1000.0);
}

#[test]
fn test_simple_exporter_dump_summary() {
    let summary = build_summary(SIMPLE_EXPORTER_DUMP, &SummaryOptions::default());

    // No gateway_requests_total family at all
    assert_eq!(summary.total_requests, 0.0);
    assert_eq!(summary.status_codes.success, 40.0);
    assert_eq!(summary.status_codes.client_error, 6.0);
    assert_eq!(summary.status_codes.server_error, 2.0);
    assert_eq!(summary.auth_success_rate, 87.5);

    assert_eq!(summary.backends.len(), 1);
    let backend = &summary.backends[0];
    assert_eq!(backend.url, "10.0.0.5:9000");
    assert!(backend.healthy);
    assert_eq!(backend.latency_ms, Some(37.5));
}

#[test]
fn test_total_requests_policies() {
    let text = "\
gateway_requests_total 100
gateway_requests_total{path=\"/a\",status=\"200\"} 30
gateway_requests_total{path=\"/b\",status=\"200\"} 50
";
    let prefer = build_summary(text, &SummaryOptions::default());
    assert_eq!(prefer.total_requests, 100.0);

    let options = SummaryOptions {
        total_requests: TotalRequestsPolicy::SumLabeled,
        ..Default::default()
    };
    assert_eq!(build_summary(text, &options).total_requests, 80.0);

    // Only labeled variants: both policies fall back to the sum
    let labeled_only = "gateway_requests_total{path=\"/a\",status=\"200\"} 30\n";
    assert_eq!(build_summary(labeled_only, &SummaryOptions::default()).total_requests, 30.0);
}

#[test]
fn test_threshold_boundary() {
    let text = "\
gateway_backend_errors_total{backend=\"edge\"} 4
gateway_backend_errors_total{backend=\"core\"} 5
";
    let summary = build_summary(text, &SummaryOptions::default());
    assert!(summary.backends[0].healthy);
    assert!(!summary.backends[1].healthy);

    let lenient = SummaryOptions {
        unhealthy_error_threshold: 6.0,
        ..Default::default()
    };
    assert!(build_summary(text, &lenient).backends.iter().all(|b| b.healthy));
}

#[test]
fn test_query_functions_over_dump() {
    let samples = parse_exposition(SIMPLE_EXPORTER_DUMP).samples;

    assert_eq!(
        value_of(&samples, "gateway_http_requests_total", &[("status", "401")]),
        6.0
    );
    assert_eq!(value_of(&samples, "gateway_missing_total", &[]), 0.0);
    assert_eq!(
        sum_matching(&samples, &NamePattern::exact("gateway_http_requests_total")),
        48.0
    );
    let auth = NamePattern::regex(r"^gateway_auth_.*_total$").unwrap();
    assert_eq!(sum_matching(&samples, &auth), 48.0);
    assert_eq!(
        distinct_label_values(&samples, "gateway_http_requests_total", "path"),
        vec!["/api/users".to_string(), "/api/login".to_string()]
    );
}

#[test]
fn test_label_order_does_not_matter() {
    let a = aggregate_endpoints("gateway_requests_total{status=\"200\",path=\"/p\"} 3\n");
    let b = aggregate_endpoints("gateway_requests_total{path=\"/p\",status=\"200\"} 3\n");
    assert_eq!(a, b);
    assert_eq!(a[0].total, 3.0);
}

#[test]
fn test_endpoint_rows_are_consistent() {
    let text = "\
gateway_requests_total{path=\"/a\",status=\"200\"} 10
gateway_requests_total{path=\"/a\",status=\"302\"} 4
gateway_requests_total{path=\"/a\",status=\"500\"} 2
gateway_requests_total{path=\"/b\",status=\"404\"} 0
gateway_requests_total{path=\"/c\",status=\"oops\"} 9
";
    let endpoints = aggregate_endpoints(text);
    assert_eq!(endpoints.len(), 2);

    for row in &endpoints {
        assert!(row.success_2xx + row.client_error_4xx + row.server_error_5xx <= row.total);
        assert!((0.0..=100.0).contains(&row.error_rate));
    }

    // 3xx counts toward the total but no class
    assert_eq!(endpoints[0].total, 16.0);
    assert_eq!(endpoints[0].error_rate, 12.5);
    assert_eq!(endpoints[1].total, 0.0);
    assert_eq!(endpoints[1].error_rate, 0.0);
}
