mod api;
mod check_config_cmd;
mod config;
mod serve;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use wisemonk_config::{config_file_path, load_and_prepare, DEFAULT_PORT};
use wisemonk_logging::{init_logger, redact_sensitive_data};

#[derive(Parser)]
#[command(name = "wisemonk")]
#[command(about = "wisemonk: keeps busy chat channels in check")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring the configured channels
    Serve {
        /// Config file (defaults to $WISEMONK_CONFIG, then ~/.wisemonk/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate a config file and print it with secrets masked
    CheckConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the status of a running server
    Status {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port } => {
            let path = config_file_path(config.as_deref());
            let config = load_and_prepare(&path).await?;
            let log_guard = init_logger(config.log_dir(), config.log_level());

            if let Err(e) = serve::run(config, port).await {
                error!(error = %redact_sensitive_data(&format!("{e:#}")), "wisemonk stopped");
                drop(log_guard);
                std::process::exit(1);
            }
        }
        Commands::CheckConfig { config } => {
            let path = config_file_path(config.as_deref());
            check_config_cmd::run(&path).await?;
        }
        Commands::Status { port } => status_cmd::run(port).await?,
    }

    Ok(())
}
