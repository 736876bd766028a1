use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gateway-console", version, about = "Admin console for the API gateway")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the console API server (default)
    Serve,

    /// Print the dashboard summary for one metrics snapshot
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        /// Error count at which a backend is reported unhealthy
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Print per-endpoint request statistics
    Endpoints {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Run a mock gateway serving synthetic metrics and an admin API
    MockGateway {
        /// Listen port (overrides mock.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve static counters without simulated traffic
        #[arg(long)]
        no_traffic: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

/// Where a one-shot command reads exposition text from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Gateway base URL (defaults to gateway.url from config)
    #[arg(short, long, conflicts_with = "file")]
    pub url: Option<String>,

    /// Read exposition text from a file instead of the gateway
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with the admin token masked)
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_summary_from_file() {
        let args = vec!["gateway-console", "summary", "--file", "dump.txt", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Summary { source, threshold } => {
                assert_eq!(source.file, Some(PathBuf::from("dump.txt")));
                assert!(source.json);
                assert!(source.url.is_none());
                assert!(threshold.is_none());
            }
            _ => panic!("Expected Summary command"),
        }
    }

    #[test]
    fn test_cli_parsing_summary_threshold() {
        let args = vec!["gateway-console", "summary", "--threshold", "10"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Summary { threshold, .. } => assert_eq!(threshold, Some(10.0)),
            _ => panic!("Expected Summary command"),
        }
    }

    #[test]
    fn test_url_and_file_conflict() {
        let args = vec![
            "gateway-console",
            "endpoints",
            "--url",
            "http://localhost:8080",
            "--file",
            "dump.txt",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_mock_gateway() {
        let args = vec!["gateway-console", "mock-gateway", "--port", "9090", "--no-traffic"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::MockGateway { port, no_traffic } => {
                assert_eq!(port, Some(9090));
                assert!(no_traffic);
            }
            _ => panic!("Expected MockGateway command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["gateway-console", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_cli_with_custom_config() {
        let args = vec!["gateway-console", "--config", "custom.toml", "serve"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.toml"));
    }
}
