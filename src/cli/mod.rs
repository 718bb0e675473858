//! Infrawatch CLI
//!
//! Command-line interface: run the HTTP server, or sample the monitors
//! directly and print verdicts as JSON.

use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use crate::energy::EnergyEfficiencyService;
use crate::network::NetworkStatusService;
use crate::server::{run_server, ServerConfig};
use crate::source::{HostNetworkSource, MetricsSource, SimulatedPowerSource};

#[derive(Parser)]
#[command(name = "infrawatch", version, about = "Infrastructure metrics monitoring service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run monitoring cycles locally and print each verdict as JSON
    Sample {
        /// Number of poll cycles
        #[arg(long, default_value_t = 5)]
        cycles: u32,
        /// Delay between cycles in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
    };
    run_server(config).await
}

/// Drive both monitors from their default sources without the HTTP layer.
/// Useful for smoke-testing a deployment's sensor wiring.
pub fn cmd_sample(cycles: u32, interval_ms: u64) -> anyhow::Result<()> {
    let mut network_source = HostNetworkSource::new()?;
    let mut power_source = SimulatedPowerSource::new()?;
    let mut network = NetworkStatusService::with_defaults()?;
    let mut energy = EnergyEfficiencyService::with_defaults()?;

    for cycle in 1..=cycles {
        info!(cycle, "collecting snapshots");

        let verdict = network.evaluate(network_source.collect()?)?;
        println!("{}", serde_json::to_string_pretty(&verdict)?);

        let report = energy.evaluate(power_source.collect()?)?;
        println!("{}", serde_json::to_string_pretty(&report)?);

        if cycle < cycles {
            std::thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    Ok(())
}
