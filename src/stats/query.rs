//! Point lookups and sums over a parsed sample sequence
//!
//! A metric that is absent from the dump reads as `0`: exposition sources
//! routinely omit zero-valued series.

use regex::Regex;

use crate::stats::sample::MetricSample;

/// How `sum_matching` selects sample names
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Full-name equality
    Exact(String),
    /// Regular expression tested against the name; anchor it yourself
    Regex(Regex),
}

impl NamePattern {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == name,
            Self::Regex(re) => re.is_match(name),
        }
    }
}

impl From<&str> for NamePattern {
    fn from(name: &str) -> Self {
        Self::exact(name)
    }
}

impl From<Regex> for NamePattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

/// Value of the first sample named `name` carrying every pair in `labels`
///
/// An empty `labels` slice skips label matching, so the first sample with
/// that name wins. Returns `0.0` when nothing matches.
pub fn value_of(samples: &[MetricSample], name: &str, labels: &[(&str, &str)]) -> f64 {
    samples
        .iter()
        .find(|s| s.name == name && s.has_labels(labels))
        .map_or(0.0, |s| s.value)
}

/// Value of the sample named `name` that has no labels at all
pub fn unlabeled_value(samples: &[MetricSample], name: &str) -> Option<f64> {
    samples
        .iter()
        .find(|s| s.name == name && s.labels.is_empty())
        .map(|s| s.value)
}

/// Sum of every sample whose name satisfies `pattern`, regardless of labels
pub fn sum_matching(samples: &[MetricSample], pattern: &NamePattern) -> f64 {
    samples
        .iter()
        .filter(|s| pattern.matches(&s.name))
        .map(|s| s.value)
        .fold(0.0, saturating_add)
}

/// Sum of samples named `name` whose `key` label satisfies `predicate`
///
/// Samples without the label never contribute.
pub fn sum_where_label<F>(samples: &[MetricSample], name: &str, key: &str, predicate: F) -> f64
where
    F: Fn(&str) -> bool,
{
    samples
        .iter()
        .filter(|s| s.name == name)
        .filter(|s| s.label(key).is_some_and(&predicate))
        .map(|s| s.value)
        .fold(0.0, saturating_add)
}

/// Addition that stays finite, pinning at `f64::MAX` / `f64::MIN` on overflow
pub fn saturating_add(acc: f64, value: f64) -> f64 {
    (acc + value).clamp(f64::MIN, f64::MAX)
}

/// Distinct non-empty values of `key` across samples named `name`, in
/// first-seen order
pub fn distinct_label_values(samples: &[MetricSample], name: &str, key: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in samples
        .iter()
        .filter(|s| s.name == name)
        .filter_map(|s| s.label(key))
        .filter(|v| !v.is_empty())
    {
        if !values.iter().any(|seen| seen == value) {
            values.push(value.to_string());
        }
    }
    values
}

/// `part / whole * 100`, or `0` when `whole` is not positive
///
/// Clamped to `[0, 100]`; counters are non-negative only by convention.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        let rate = part / whole * 100.0;
        if rate.is_finite() {
            return rate.clamp(0.0, 100.0);
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::sample::parse_samples;

    const TEXT: &str = r#"
gateway_backend_errors_total{backend="a"} 3
gateway_backend_errors_total{backend="b"} 4
gateway_backend_errors_total{backend="a",zone="eu"} 9
gateway_backend_latency_seconds{backend="a"} 0.2
gateway_requests_total{path="/x",status="200"} 5
gateway_requests_total{path="/x",status="404"} 1
gateway_requests_total 6
"#;

    #[test]
    fn test_value_of_empty_sequence_is_zero() {
        assert_eq!(value_of(&[], "anything", &[]), 0.0);
        assert_eq!(value_of(&[], "anything", &[("k", "v")]), 0.0);
    }

    #[test]
    fn test_value_of_first_match_wins() {
        let samples = parse_samples(TEXT);
        assert_eq!(value_of(&samples, "gateway_backend_errors_total", &[]), 3.0);
        assert_eq!(
            value_of(&samples, "gateway_backend_errors_total", &[("backend", "b")]),
            4.0
        );
        assert_eq!(
            value_of(&samples, "gateway_backend_errors_total", &[("zone", "eu")]),
            9.0
        );
        assert_eq!(
            value_of(&samples, "gateway_backend_errors_total", &[("backend", "c")]),
            0.0
        );
    }

    #[test]
    fn test_unlabeled_value() {
        let samples = parse_samples(TEXT);
        assert_eq!(unlabeled_value(&samples, "gateway_requests_total"), Some(6.0));
        assert_eq!(unlabeled_value(&samples, "gateway_backend_errors_total"), None);
    }

    #[test]
    fn test_sum_matching_exact_and_regex() {
        let samples = parse_samples("m 3\nm{k=\"v\"} 4\nother 10");
        assert_eq!(sum_matching(&samples, &NamePattern::exact("m")), 7.0);
        assert_eq!(sum_matching(&samples, &NamePattern::exact("missing")), 0.0);

        let pattern = NamePattern::regex("^(m|other)$").unwrap();
        assert_eq!(sum_matching(&samples, &pattern), 17.0);
        assert_eq!(sum_matching(&[], &pattern), 0.0);
    }

    #[test]
    fn test_name_pattern_rejects_bad_regex() {
        assert!(NamePattern::regex("(").is_err());
    }

    #[test]
    fn test_sum_where_label() {
        let samples = parse_samples(TEXT);
        let success = sum_where_label(&samples, "gateway_requests_total", "status", |s| {
            s.starts_with('2')
        });
        assert_eq!(success, 5.0);
        let any = sum_where_label(&samples, "gateway_requests_total", "status", |_| true);
        assert_eq!(any, 6.0);
    }

    #[test]
    fn test_distinct_label_values_first_seen_order() {
        let samples = parse_samples(TEXT);
        assert_eq!(
            distinct_label_values(&samples, "gateway_backend_errors_total", "backend"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(distinct_label_values(&samples, "absent", "backend").is_empty());
    }

    #[test]
    fn test_sums_stay_finite_on_overflow() {
        let samples = parse_samples("m{k=\"a\"} 1e308\nm{k=\"b\"} 1e308\nm{k=\"c\"} -1e308\n");
        let total = sum_matching(&samples, &NamePattern::exact("m"));
        assert!(total.is_finite());
        assert_eq!(sum_where_label(&samples, "m", "k", |_| true), total);
        assert_eq!(saturating_add(f64::MAX, f64::MAX), f64::MAX);
        assert_eq!(saturating_add(f64::MIN, -1e308), f64::MIN);
    }

    #[test]
    fn test_percentage_guards() {
        assert_eq!(percentage(1.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, -3.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
        assert_eq!(percentage(-1.0, 4.0), 0.0);
        assert_eq!(percentage(f64::MAX, f64::MIN_POSITIVE), 0.0);
    }
}
