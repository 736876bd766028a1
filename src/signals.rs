use anyhow::Result;
use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::config::{self, Config};
use crate::logging::mask_token;

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, clean up)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Configuration reload from `config_path`
#[cfg(unix)]
pub fn setup_signal_handlers(
    config: Arc<ArcSwap<Config>>,
    config_path: PathBuf,
) -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        let streams = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        );
        let (mut sigterm, mut sigint, mut sighup) = match streams {
            (Ok(term), Ok(int), Ok(hup)) => (term, int, hup),
            (term, int, hup) => {
                let e = term.err().or(int.err()).or(hup.err());
                error!("Failed to install signal handlers, falling back to Ctrl+C: {:?}", e);
                wait_for_ctrl_c(&tx_clone).await;
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading configuration");
                    if let Err(e) = reload_config(&config, &config_path) {
                        error!("Failed to reload configuration: {}", e);
                    } else {
                        info!("Configuration reloaded successfully");
                    }
                }
            }
        }
    });

    (shutdown_tx, handle)
}

/// Windows placeholder - signals not fully supported
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _config: Arc<ArcSwap<Config>>,
    _config_path: PathBuf,
) -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        wait_for_ctrl_c(&tx_clone).await;
    });

    (shutdown_tx, handle)
}

async fn wait_for_ctrl_c(tx: &broadcast::Sender<ShutdownSignal>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Ctrl+C received, initiating shutdown");
            let _ = tx.send(ShutdownSignal::Graceful);
        }
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    }
}

/// Reload configuration atomically
///
/// If loading or validation fails the old configuration stays in place.
pub fn reload_config(config: &ArcSwap<Config>, path: &std::path::Path) -> Result<()> {
    let new_config = config::load_config(path)?;

    info!(
        gateway = %new_config.gateway.url,
        admin_token = %mask_token(new_config.gateway.admin_token.as_deref()),
        unhealthy_error_threshold = new_config.dashboard.unhealthy_error_threshold,
        "New configuration loaded"
    );

    let old = config.load();
    if old.server.host != new_config.server.host || old.server.port != new_config.server.port {
        info!("Listener address changes take effect after restart");
    }

    config.store(Arc::new(new_config));
    Ok(())
}
