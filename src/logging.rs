//! Logging setup and secret masking
//!
//! The console holds the gateway admin token; anything that logs it goes
//! through [`SensitiveToken`].

use std::fmt;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Masked display of a bearer token
///
/// Shows the first 8 characters followed by `***`; short tokens are fully
/// masked.
#[derive(Clone, Debug)]
pub struct SensitiveToken<'a> {
    inner: &'a str,
}

impl<'a> SensitiveToken<'a> {
    /// ```
    /// use gateway_console::logging::SensitiveToken;
    ///
    /// let token = "2af82383ba0a6a5e995484952b3f7241";
    /// assert_eq!(SensitiveToken::new(token).to_string(), "2af82383***");
    /// ```
    pub fn new(token: &'a str) -> Self {
        Self { inner: token }
    }
}

impl<'a> fmt::Display for SensitiveToken<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const VISIBLE: usize = 8;
        match self.inner.char_indices().nth(VISIBLE) {
            Some((cut, _)) => write!(f, "{}***", &self.inner[..cut]),
            None => write!(f, "***"),
        }
    }
}

/// Mask an optional token for display, `"<unset>"` when absent
pub fn mask_token(token: Option<&str>) -> String {
    token.map_or_else(|| "<unset>".to_string(), |t| SensitiveToken::new(t).to_string())
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `default_level`. `format` is `json` or
/// `text`.
pub fn init_tracing_with(default_level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if format == "json" {
        registry
            .with(tracing_fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(tracing_fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        eprintln!("Warning: tracing subscriber already installed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_token_display() {
        let token = "2af82383ba0a6a5e995484952b3f7241053184850c1209857af77bc1a39bd077";
        assert_eq!(SensitiveToken::new(token).to_string(), "2af82383***");
    }

    #[test]
    fn test_sensitive_token_short() {
        assert_eq!(SensitiveToken::new("short").to_string(), "***");
        assert_eq!(SensitiveToken::new("12345678").to_string(), "***");
    }

    #[test]
    fn test_sensitive_token_multibyte() {
        assert_eq!(SensitiveToken::new("ééééééééé").to_string(), "éééééééé***");
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(None), "<unset>");
        assert_eq!(mask_token(Some("abcdefghijkl")), "abcdefgh***");
    }
}
