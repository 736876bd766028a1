//! HTTP handlers for the console API
//!
//! Thin glue: fetch from the gateway, hand text to the stats engine or pass
//! admin JSON through, translate failures into `AppError`.

pub mod admin_api;
pub mod health;
pub mod metrics_api;

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::Config;
use crate::stats::{GatewayClient, SummaryOptions};

/// State shared by console API handlers
#[derive(Clone)]
pub struct ConsoleState {
    pub config: Arc<ArcSwap<Config>>,
    pub http_client: reqwest::Client,
}

impl ConsoleState {
    pub fn new(config: Arc<ArcSwap<Config>>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Gateway client for the currently loaded configuration
    ///
    /// Built per request so a reload takes effect immediately; the
    /// connection pool is shared.
    pub fn gateway(&self) -> GatewayClient {
        GatewayClient::from_config(self.http_client.clone(), &self.config.load().gateway)
    }

    pub fn summary_options(&self) -> SummaryOptions {
        self.config.load().dashboard.summary_options()
    }
}
