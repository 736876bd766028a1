use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::stats::summary::{SummaryOptions, TotalRequestsPolicy, DEFAULT_UNHEALTHY_ERROR_THRESHOLD};

/// Prefix for environment overrides, e.g. `GATEWAY_CONSOLE__GATEWAY__URL`
pub const ENV_PREFIX: &str = "GATEWAY_CONSOLE";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub mock: MockGatewayConfig,
}

/// Console API listener
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_server_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// The gateway whose metrics and admin API the console fronts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
    /// Bearer token for `/admin/*`; admin routes fail without it
    #[serde(default)]
    pub admin_token: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            admin_token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Knobs for the summary builder
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default = "default_unhealthy_error_threshold")]
    pub unhealthy_error_threshold: f64,
    #[serde(default)]
    pub total_requests: TotalRequestsPolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            unhealthy_error_threshold: default_unhealthy_error_threshold(),
            total_requests: TotalRequestsPolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            unhealthy_error_threshold: self.unhealthy_error_threshold,
            total_requests: self.total_requests,
        }
    }
}

/// Listener for the `mock-gateway` command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockGatewayConfig {
    #[serde(default = "default_mock_host")]
    pub host: String,
    #[serde(default = "default_mock_port")]
    pub port: u16,
    /// Interval between simulated traffic ticks
    #[serde(default = "default_traffic_interval_ms")]
    pub traffic_interval_ms: u64,
}

impl Default for MockGatewayConfig {
    fn default() -> Self {
        Self {
            host: default_mock_host(),
            port: default_mock_port(),
            traffic_interval_ms: default_traffic_interval_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_gateway_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_unhealthy_error_threshold() -> f64 {
    DEFAULT_UNHEALTHY_ERROR_THRESHOLD
}

fn default_mock_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mock_port() -> u16 {
    8080
}

fn default_traffic_interval_ms() -> u64 {
    1000
}

/// Load configuration from `path` plus `GATEWAY_CONSOLE__*` environment
/// overrides
///
/// A missing file is not an error: every setting has a default.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults and environment");
    }

    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be greater than 0");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("server.log_format must be 'text' or 'json', got '{}'", other),
    }

    let url = reqwest::Url::parse(&cfg.gateway.url)
        .map_err(|e| anyhow::anyhow!("gateway.url '{}' is invalid: {}", cfg.gateway.url, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("gateway.url must use http or https, got '{}'", url.scheme());
    }

    if cfg.gateway.timeout_seconds == 0 {
        anyhow::bail!("gateway.timeout_seconds must be greater than 0");
    }

    if let Some(token) = &cfg.gateway.admin_token {
        if token.trim().is_empty() {
            anyhow::bail!("gateway.admin_token cannot be empty when set");
        }
    }

    let threshold = cfg.dashboard.unhealthy_error_threshold;
    if !threshold.is_finite() || threshold <= 0.0 {
        anyhow::bail!(
            "dashboard.unhealthy_error_threshold must be a positive number, got {}",
            threshold
        );
    }

    if cfg.mock.port == 0 {
        anyhow::bail!("mock.port must be greater than 0");
    }

    if cfg.mock.traffic_interval_ms == 0 {
        anyhow::bail!("mock.traffic_interval_ms must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = Config::default();
        assert!(validate_config(&cfg).is_ok());
        assert_eq!(cfg.gateway.url, "http://localhost:8080");
        assert_eq!(cfg.dashboard.unhealthy_error_threshold, 5.0);
        assert_eq!(cfg.dashboard.total_requests, TotalRequestsPolicy::PreferUnlabeled);
    }

    #[test]
    fn test_validate_rejects_bad_gateway_url() {
        let mut cfg = Config::default();
        cfg.gateway.url = "not a url".to_string();
        assert!(validate_config(&cfg).unwrap_err().to_string().contains("gateway.url"));

        cfg.gateway.url = "ftp://gateway".to_string();
        assert!(validate_config(&cfg).unwrap_err().to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_non_positive_threshold() {
        let mut cfg = Config::default();
        cfg.dashboard.unhealthy_error_threshold = 0.0;
        assert!(validate_config(&cfg).is_err());

        cfg.dashboard.unhealthy_error_threshold = f64::NAN;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut cfg = Config::default();
        cfg.server.log_format = "xml".to_string();
        assert!(validate_config(&cfg).unwrap_err().to_string().contains("log_format"));
    }

    #[test]
    fn test_validate_rejects_blank_admin_token() {
        let mut cfg = Config::default();
        cfg.gateway.admin_token = Some("   ".to_string());
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[gateway]
url = "http://gateway.internal:9000"
admin_token = "secret-admin-token"

[dashboard]
unhealthy_error_threshold = 10
total_requests = "sum_labeled"
"#
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.gateway.url, "http://gateway.internal:9000");
        assert_eq!(cfg.gateway.admin_token.as_deref(), Some("secret-admin-token"));
        assert_eq!(cfg.dashboard.unhealthy_error_threshold, 10.0);
        assert_eq!(cfg.dashboard.total_requests, TotalRequestsPolicy::SumLabeled);
        assert_eq!(cfg.server.port, 3000);

        let options = cfg.dashboard.summary_options();
        assert_eq!(options.unhealthy_error_threshold, 10.0);
        assert_eq!(options.total_requests, TotalRequestsPolicy::SumLabeled);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.gateway.url, "http://localhost:8080");
        assert!(cfg.gateway.admin_token.is_none());
    }
}
