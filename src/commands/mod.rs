//! Command implementations for the CLI
//!
//! This module contains the implementation of all CLI commands:
//! - serve: Start the console API server
//! - summary: One-shot dashboard summary
//! - endpoints: One-shot per-endpoint statistics
//! - mock_gateway: Local stand-in gateway
//! - config: Configuration display and validation

pub mod config;
pub mod endpoints;
pub mod mock_gateway;
pub mod serve;
pub mod summary;

use anyhow::{Context, Result};
use gateway_console::{config as console_config, stats::GatewayClient};
use std::path::Path;
use tracing::info;

use crate::cli::SourceArgs;

/// Read exposition text from `--file`, or fetch it from `--url` / the
/// configured gateway
pub(crate) async fn load_exposition(config_path: &Path, source: &SourceArgs) -> Result<String> {
    if let Some(file) = &source.file {
        info!(file = %file.display(), "Reading exposition text from file");
        return std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()));
    }

    let mut gateway = console_config::load_config(config_path)?.gateway;
    if let Some(url) = &source.url {
        gateway.url = url.clone();
    }

    let client = GatewayClient::from_config(reqwest::Client::new(), &gateway);
    info!(url = %client.metrics_url(), "Fetching gateway metrics");
    client
        .fetch_metrics()
        .await
        .with_context(|| format!("Failed to fetch metrics from {}", client.metrics_url()))
}
