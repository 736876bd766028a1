use anyhow::Result;
use colored::Colorize;
use gateway_console::{
    config,
    logging::mask_token,
    mock::{create_mock_router, run_traffic, GatewayCounters, MockGatewayState},
    signals::ShutdownSignal,
};
use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Execute the mock-gateway command
///
/// The admin API checks the same `gateway.admin_token` the console sends, so
/// one config file drives both sides.
pub async fn execute(config_path: &Path, port: Option<u16>, no_traffic: bool) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let mut mock_cfg = cfg.mock.clone();
    if let Some(port) = port {
        if port == 0 {
            anyhow::bail!("Invalid port: 0");
        }
        mock_cfg.port = port;
    }

    let admin_token = cfg.gateway.admin_token.clone();
    if admin_token.is_none() {
        warn!("gateway.admin_token is not set; mock /admin/* will reject every request");
    }

    let counters = Arc::new(GatewayCounters::new());
    let state = MockGatewayState::new(counters.clone(), admin_token.clone());
    let app = create_mock_router(state);

    let (shutdown_tx, _) = broadcast::channel::<ShutdownSignal>(4);

    let traffic_handle = if no_traffic {
        None
    } else {
        Some(tokio::spawn(run_traffic(
            counters,
            Duration::from_millis(mock_cfg.traffic_interval_ms),
            shutdown_tx.subscribe(),
        )))
    };

    let addr = SocketAddr::from((mock_cfg.host.parse::<std::net::IpAddr>()?, mock_cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("{}", format!("Mock gateway listening on http://{}", addr).green());
    info!(
        %addr,
        admin_token = %mask_token(admin_token.as_deref()),
        traffic = !no_traffic,
        "Mock gateway started"
    );

    let tx = shutdown_tx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Ctrl+C received, stopping mock gateway"),
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
            let _ = tx.send(ShutdownSignal::Graceful);
        })
        .await?;

    if let Some(handle) = traffic_handle {
        let _ = shutdown_tx.send(ShutdownSignal::Graceful);
        handle.await?;
    }

    info!("Mock gateway stopped");
    Ok(())
}
