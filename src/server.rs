use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, ConsoleState},
    logging::mask_token,
    metrics,
    signals::setup_signal_handlers,
};

/// Start the console API server
///
/// This function:
/// 1. Initializes the console's own metrics
/// 2. Sets up signal handlers for graceful shutdown and config reload
/// 3. Creates the Axum application
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP for reload)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let state = ConsoleState::new(config_swap);
    let app = create_router(state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting gateway console on {}", addr);
    info!(
        gateway = %config.gateway.url,
        admin_token = %mask_token(config.gateway.admin_token.as_deref()),
        unhealthy_error_threshold = config.dashboard.unhealthy_error_threshold,
        total_requests = ?config.dashboard.total_requests,
        "Console configuration"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Console stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: ConsoleState, metrics_handle: Arc<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/metrics", get(handlers::metrics_api::get_raw_metrics))
        .route("/api/metrics/summary", get(handlers::metrics_api::get_summary))
        .route("/api/logs", get(handlers::metrics_api::get_endpoints))
        .route(
            "/api/config",
            get(handlers::admin_api::get_config).post(handlers::admin_api::update_config),
        )
        .route(
            "/api/routes",
            get(handlers::admin_api::get_routes).post(handlers::admin_api::update_routes),
        )
        .route("/api/cache/stats", get(handlers::admin_api::get_cache_stats))
        .route("/api/cache/clear", post(handlers::admin_api::clear_cache))
        .route(
            "/api/cache/config",
            get(handlers::admin_api::get_cache_config)
                .post(handlers::admin_api::update_cache_config),
        )
        .route("/api/ratelimit/reset", post(handlers::admin_api::reset_rate_limit))
        .route(
            "/api/ratelimit/config",
            get(handlers::admin_api::get_rate_limit_config)
                .post(handlers::admin_api::update_rate_limit_config),
        )
        .route(
            "/api/security",
            get(handlers::admin_api::get_security_config)
                .post(handlers::admin_api::update_security_config),
        )
        .with_state(state);

    Router::new()
        // Public endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_api::console_metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        // Admin config bodies are small; cap at 1MB
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
