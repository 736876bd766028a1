use anyhow::Result;
use colored::Colorize;
use gateway_console::{config, logging, server};
use std::path::Path;
use tracing::info;

/// Execute the serve command
///
/// This will:
/// 1. Load configuration
/// 2. Install the tracing subscriber with the configured level and format
/// 3. Start the server (blocks until shutdown)
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting gateway console...".green());

    let cfg = config::load_config(config_path)?;
    logging::init_tracing_with(&cfg.server.log_level, &cfg.server.log_format);

    info!(config = %config_path.display(), "Starting gateway console");
    server::start_server(cfg, config_path.to_path_buf()).await?;

    Ok(())
}
