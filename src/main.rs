use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use gateway_console::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();
    let command = args.get_command();

    // `serve` installs its own subscriber from the configured level and format
    if !matches!(command, cli::Commands::Serve) {
        init_tracing();
    }

    // Dispatch to appropriate command handler
    match command {
        cli::Commands::Serve => {
            commands::serve::execute(&args.config).await?;
        }
        cli::Commands::Summary { source, threshold } => {
            commands::summary::execute(&args.config, source, threshold).await?;
        }
        cli::Commands::Endpoints { source } => {
            commands::endpoints::execute(&args.config, source).await?;
        }
        cli::Commands::MockGateway { port, no_traffic } => {
            commands::mock_gateway::execute(&args.config, port, no_traffic).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Gateway Console v{}", env!("CARGO_PKG_VERSION"));
            println!("Rust {}", env!("CARGO_PKG_RUST_VERSION"));
        }
    }

    Ok(())
}
