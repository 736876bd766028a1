//! Exposition text parsing
//!
//! Turns the gateway's line-oriented metrics dump into typed samples. Parsing
//! is best effort: a malformed line is skipped and counted, it never
//! invalidates the rest of the snapshot.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_:][A-Za-z0-9_:]*").expect("metric name pattern"));

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"([^"]*)"\s*"#).expect("label pair pattern")
});

static VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("sample value pattern")
});

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("timestamp pattern"));

/// One `name{labels} value` observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

impl MetricSample {
    /// Label value by key
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// True if every `(key, value)` pair is present on this sample
    pub fn has_labels(&self, wanted: &[(&str, &str)]) -> bool {
        wanted
            .iter()
            .all(|(key, value)| self.label(key) == Some(*value))
    }
}

/// Why a data line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("missing or invalid metric name")]
    InvalidName,
    #[error("unterminated label set")]
    UnterminatedLabels,
    #[error("malformed label near `{0}`")]
    InvalidLabel(String),
    #[error("unexpected character `{0}` after metric name")]
    UnexpectedCharacter(char),
    #[error("missing sample value")]
    MissingValue,
    #[error("invalid sample value `{0}`")]
    InvalidValue(String),
    #[error("unexpected trailing input `{0}`")]
    TrailingInput(String),
}

/// Samples from one parse pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exposition {
    pub samples: Vec<MetricSample>,
    /// Data lines dropped because they did not match the grammar
    pub skipped: usize,
}

/// Parse a single exposition line
///
/// Returns `Ok(None)` for comments (`#` directives) and blank lines. When a
/// label key repeats within the braces the later occurrence wins.
pub fn parse_line(line: &str) -> Result<Option<MetricSample>, LineError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let name = NAME_RE.find(line).ok_or(LineError::InvalidName)?;
    let mut rest = &line[name.end()..];

    let mut labels = BTreeMap::new();
    if let Some(body) = rest.strip_prefix('{') {
        let (parsed, after) = parse_labels(body)?;
        labels = parsed;
        rest = after;
    }

    match rest.chars().next() {
        None => return Err(LineError::MissingValue),
        Some(c) if !c.is_whitespace() => return Err(LineError::UnexpectedCharacter(c)),
        Some(_) => {}
    }

    let mut fields = rest.split_whitespace();
    let raw_value = fields.next().ok_or(LineError::MissingValue)?;
    if !VALUE_RE.is_match(raw_value) {
        return Err(LineError::InvalidValue(raw_value.to_string()));
    }
    let value: f64 = raw_value
        .parse()
        .map_err(|_| LineError::InvalidValue(raw_value.to_string()))?;
    // Exponent overflow parses to an infinity
    if !value.is_finite() {
        return Err(LineError::InvalidValue(raw_value.to_string()));
    }

    // Optional millisecond timestamp, accepted and ignored
    if let Some(timestamp) = fields.next() {
        if !TIMESTAMP_RE.is_match(timestamp) {
            return Err(LineError::TrailingInput(timestamp.to_string()));
        }
    }
    if let Some(extra) = fields.next() {
        return Err(LineError::TrailingInput(extra.to_string()));
    }

    Ok(Some(MetricSample {
        name: name.as_str().to_string(),
        labels,
        value,
    }))
}

/// Parse the body of a label set (text after `{`), returning the labels and
/// whatever follows the closing brace.
fn parse_labels(body: &str) -> Result<(BTreeMap<String, String>, &str), LineError> {
    let mut labels = BTreeMap::new();
    let mut rest = body;

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix('}') {
            return Ok((labels, after));
        }
        if rest.is_empty() {
            return Err(LineError::UnterminatedLabels);
        }

        let caps = LABEL_RE
            .captures(rest)
            .ok_or_else(|| LineError::InvalidLabel(snippet(rest)))?;
        let consumed = caps.get(0).map_or(0, |m| m.end());
        let key = caps.get(1).map_or("", |m| m.as_str());
        let value = caps.get(2).map_or("", |m| m.as_str());
        labels.insert(key.to_string(), value.to_string());
        rest = &rest[consumed..];

        if let Some(after) = rest.strip_prefix(',') {
            rest = after;
        } else if let Some(after) = rest.strip_prefix('}') {
            return Ok((labels, after));
        } else if rest.is_empty() {
            return Err(LineError::UnterminatedLabels);
        } else {
            return Err(LineError::InvalidLabel(snippet(rest)));
        }
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(16).collect()
}

/// Parse a full exposition dump
pub fn parse_exposition(text: &str) -> Exposition {
    let mut exposition = Exposition::default();

    for (index, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(sample)) => exposition.samples.push(sample),
            Ok(None) => {}
            Err(e) => {
                exposition.skipped += 1;
                debug!(line = index + 1, error = %e, "Skipping malformed exposition line");
            }
        }
    }

    if exposition.skipped > 0 {
        warn!(
            skipped = exposition.skipped,
            parsed = exposition.samples.len(),
            "Exposition contained malformed lines"
        );
    }

    exposition
}

/// Convenience wrapper returning only the samples
pub fn parse_samples(text: &str) -> Vec<MetricSample> {
    parse_exposition(text).samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(line: &str) -> MetricSample {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_labeled_sample() {
        let s = sample(r#"http_hits{k="v"} 1.5"#);
        assert_eq!(s.name, "http_hits");
        assert_eq!(s.labels.len(), 1);
        assert_eq!(s.label("k"), Some("v"));
        assert_eq!(s.value, 1.5);
    }

    #[test]
    fn test_parse_unlabeled_sample() {
        let s = sample("gateway_requests_total 42");
        assert!(s.labels.is_empty());
        assert_eq!(s.value, 42.0);
    }

    #[test]
    fn test_comments_and_blank_lines_yield_nothing() {
        assert_eq!(parse_line("# HELP gateway_requests_total Total"), Ok(None));
        assert_eq!(parse_line("# TYPE gateway_requests_total counter"), Ok(None));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t "), Ok(None));
    }

    #[test]
    fn test_numeric_grammar() {
        assert_eq!(sample("m 1e3").value, 1000.0);
        assert_eq!(sample("m 2.5E-1").value, 0.25);
        assert_eq!(sample("m -7").value, -7.0);
        assert_eq!(sample("m +3.").value, 3.0);
        assert_eq!(sample("m .5").value, 0.5);
    }

    #[test]
    fn test_rejects_non_numeric_values() {
        assert!(matches!(parse_line("m abc"), Err(LineError::InvalidValue(_))));
        assert!(matches!(parse_line("m 1.2.3"), Err(LineError::InvalidValue(_))));
        assert!(matches!(parse_line("m NaN"), Err(LineError::InvalidValue(_))));
        assert!(matches!(parse_line("m +Inf"), Err(LineError::InvalidValue(_))));
        assert!(matches!(parse_line("m 1e999"), Err(LineError::InvalidValue(_))));
        assert!(matches!(parse_line("m -1e400"), Err(LineError::InvalidValue(_))));
        assert_eq!(parse_line("m"), Err(LineError::MissingValue));
    }

    #[test]
    fn test_rejects_missing_name() {
        assert_eq!(parse_line(r#"{k="v"} 1"#), Err(LineError::InvalidName));
        assert_eq!(parse_line("9metric 1"), Err(LineError::InvalidName));
    }

    #[test]
    fn test_rejects_unbalanced_braces() {
        assert_eq!(
            parse_line(r#"m{k="v" 1"#),
            Err(LineError::InvalidLabel("1".to_string()))
        );
        assert_eq!(parse_line(r#"m{k="v","#), Err(LineError::UnterminatedLabels));
        assert_eq!(
            parse_line(r#"m{k="v"}} 1"#),
            Err(LineError::UnexpectedCharacter('}'))
        );
    }

    #[test]
    fn test_repeated_label_key_last_wins() {
        let s = sample(r#"m{status="200",status="500"} 1"#);
        assert_eq!(s.labels.len(), 1);
        assert_eq!(s.label("status"), Some("500"));
    }

    #[test]
    fn test_label_values_are_verbatim() {
        let s = sample(r#"m{path="/api/{id},x", empty=""} 2"#);
        assert_eq!(s.label("path"), Some("/api/{id},x"));
        assert_eq!(s.label("empty"), Some(""));
    }

    #[test]
    fn test_empty_label_set_and_trailing_comma() {
        assert!(sample("m{} 1").labels.is_empty());
        assert_eq!(sample(r#"m{a="1",} 1"#).label("a"), Some("1"));
    }

    #[test]
    fn test_timestamp_is_accepted_and_ignored() {
        assert_eq!(sample("m 3 1700000000000").value, 3.0);
        assert!(matches!(
            parse_line("m 3 1700000000000 extra"),
            Err(LineError::TrailingInput(_))
        ));
        assert!(matches!(parse_line("m 3 soon"), Err(LineError::TrailingInput(_))));
    }

    #[test]
    fn test_malformed_line_does_not_affect_neighbours() {
        let text = "a 1\nb{x=\"1\" 2\nc notanumber\n{k=\"v\"} 3\nd 4";
        let exposition = parse_exposition(text);
        assert_eq!(exposition.skipped, 3);
        let names: Vec<_> = exposition.samples.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "d"]);
    }

    #[test]
    fn test_missing_trailing_newline_and_crlf() {
        let samples = parse_samples("a 1\r\nb 2");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].value, 2.0);
    }

    #[test]
    fn test_has_labels_is_superset_match() {
        let s = sample(r#"m{a="1",b="2"} 1"#);
        assert!(s.has_labels(&[]));
        assert!(s.has_labels(&[("a", "1")]));
        assert!(s.has_labels(&[("b", "2"), ("a", "1")]));
        assert!(!s.has_labels(&[("a", "2")]));
        assert!(!s.has_labels(&[("c", "1")]));
    }
}
