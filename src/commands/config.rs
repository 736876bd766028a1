use anyhow::Result;
use colored::Colorize;
use gateway_console::{
    config::{self, Config},
    logging::mask_token,
};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration (file plus environment) with the
/// admin token masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!(path = %config_path.display(), "Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!(path = %config_path.display(), "Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Console: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Gateway: {}", cfg.gateway.url);
    println!(
        "  Admin token: {}",
        if cfg.gateway.admin_token.is_some() {
            "configured".green()
        } else {
            "not configured (admin routes disabled)".yellow()
        }
    );
    println!(
        "  Unhealthy at: {} backend errors",
        cfg.dashboard.unhealthy_error_threshold
    );

    info!("Configuration validation successful");
    Ok(())
}

/// Mask the admin token for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    if sanitized.gateway.admin_token.is_some() {
        sanitized.gateway.admin_token = Some(mask_token(cfg.gateway.admin_token.as_deref()));
    }
    sanitized
}
