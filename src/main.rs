//! Infrawatch - Main Entry Point
//!
//! Infrastructure metrics monitoring service with CLI and server modes.

use clap::Parser;
use infrawatch::cli::{cmd_sample, cmd_serve, Cli, Commands};
use infrawatch::server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infrawatch=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            cmd_serve(&host, port).await?;
        }
        Some(Commands::Sample { cycles, interval_ms }) => {
            cmd_sample(cycles, interval_ms)?;
        }
        None => {
            // Default: serve with environment-derived configuration
            run_server(ServerConfig::default()).await?;
        }
    }

    Ok(())
}
