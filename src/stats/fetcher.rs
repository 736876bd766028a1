//! HTTP client for the gateway's metrics and admin endpoints
//!
//! Transport, bearer-token attachment and error translation live here; the
//! parsing engine only ever sees the text this returns.

use axum::http::StatusCode;
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::AppError;
use crate::metrics::record_upstream_request;

/// Client for one gateway
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    admin_token: Option<String>,
    timeout: Duration,
}

impl GatewayClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (connection pool)
    /// * `base_url` - Gateway root, e.g. "http://localhost:8080"
    /// * `admin_token` - Bearer token for `/admin/*`
    /// * `timeout` - Per-request timeout
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        admin_token: Option<String>,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            admin_token,
            timeout,
        }
    }

    pub fn from_config(client: Client, cfg: &GatewayConfig) -> Self {
        Self::new(
            client,
            cfg.url.clone(),
            cfg.admin_token.clone(),
            Duration::from_secs(cfg.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics_url(&self) -> String {
        format!("{}/metrics", self.base_url)
    }

    /// Fetch the raw exposition text from `/metrics` (no auth)
    ///
    /// # Errors
    /// - `HttpRequest` if the gateway cannot be reached or the body cannot be read
    /// - `UpstreamError` if the gateway answers with a non-2xx status
    pub async fn fetch_metrics(&self) -> Result<String, AppError> {
        let request = self
            .client
            .get(self.metrics_url())
            .header(header::ACCEPT, "text/plain");

        let response = self.send("/metrics", request).await?;
        Ok(response.text().await?)
    }

    /// `GET /admin/{path}` with the admin bearer token
    pub async fn get_admin(&self, path: &str) -> Result<Value, AppError> {
        let endpoint = admin_endpoint(path);
        let request = self.client.get(format!("{}{}", self.base_url, endpoint));
        let request = self.authorize(request)?;

        let response = self.send(&endpoint, request).await?;
        Ok(response.json().await?)
    }

    /// `POST /admin/{path}` with the admin bearer token and a JSON body
    pub async fn post_admin(&self, path: &str, body: Option<&Value>) -> Result<Value, AppError> {
        let endpoint = admin_endpoint(path);
        let mut request = self.client.post(format!("{}{}", self.base_url, endpoint));
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request)?;

        let response = self.send(&endpoint, request).await?;
        Ok(response.json().await?)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AppError> {
        let token = self
            .admin_token
            .as_deref()
            .ok_or_else(|| AppError::ConfigError("Admin token not configured".to_string()))?;
        Ok(request.bearer_auth(token))
    }

    /// Send with timeout, translate non-2xx into `UpstreamError` and record
    /// console metrics
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, AppError> {
        let start = Instant::now();
        let result = request.timeout(self.timeout).send().await;
        let elapsed = start.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint, error = %e, "Gateway request failed");
                record_upstream_request(endpoint, "transport_error", elapsed);
                return Err(AppError::HttpRequest(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            record_upstream_request(endpoint, "upstream_error", elapsed);
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "Gateway returned an error status");
            return Err(AppError::UpstreamError {
                status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                message: format!("Gateway error: {}", body),
            });
        }

        debug!(
            endpoint,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Gateway request succeeded"
        );
        record_upstream_request(endpoint, "success", elapsed);
        Ok(response)
    }
}

/// Normalize `config`, `/config` or `/admin/config` to `/admin/config`
fn admin_endpoint(path: &str) -> String {
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("admin/").unwrap_or(path);
    format!("/admin/{}", path)
}
