pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod mock;
pub mod server;
pub mod signals;
pub mod stats;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging for CLI commands
///
/// Note: The subscriber can only be installed once. The `serve` command uses
/// [`logging::init_tracing_with`] instead so the configured level and format apply.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}
