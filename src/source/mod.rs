//! Metrics sources
//!
//! Pull-model snapshot producers. The monitor does not poll; the caller
//! decides cadence, collects a [`Snapshot`] from a source, and feeds it to a
//! service. Real sensors implement [`MetricsSource`]; module-level random
//! generators from the original dashboard are replaced by injectable sources.

use crate::energy;
use crate::error::{MonitorError, Result};
use crate::monitor::Snapshot;
use crate::network;
use chrono::Timelike;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sysinfo::Networks;
use tracing::debug;

/// A metrics source supplying one snapshot on demand
pub trait MetricsSource: Send {
    fn collect(&mut self) -> Result<Snapshot>;
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    // Normal::new accepts a negative sigma (it mirrors the distribution), so
    // enforce the non-negative contract here.
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(MonitorError::Configuration(format!(
            "invalid distribution: std_dev must be finite and non-negative, got {std_dev}"
        )));
    }
    Normal::new(mean, std_dev)
        .map_err(|e| MonitorError::Configuration(format!("invalid distribution: {e}")))
}

/// Network traffic counters from the host's interfaces via `sysinfo`.
///
/// Latency is sampled from a normal distribution until a real probe is wired
/// in; counters are genuine cumulative totals summed across interfaces.
pub struct HostNetworkSource {
    networks: Networks,
    latency: Normal<f64>,
    rng: StdRng,
}

impl HostNetworkSource {
    /// Source with the default simulated latency profile (mean 20 ms, σ 5 ms)
    pub fn new() -> Result<Self> {
        Self::with_latency_profile(20.0, 5.0)
    }

    pub fn with_latency_profile(mean_ms: f64, std_dev_ms: f64) -> Result<Self> {
        Ok(Self {
            networks: Networks::new_with_refreshed_list(),
            latency: normal(mean_ms, std_dev_ms)?,
            rng: StdRng::from_entropy(),
        })
    }
}

impl MetricsSource for HostNetworkSource {
    fn collect(&mut self) -> Result<Snapshot> {
        self.networks.refresh();

        let mut bytes_sent = 0u64;
        let mut bytes_recv = 0u64;
        let mut packets_sent = 0u64;
        let mut packets_recv = 0u64;
        for (_name, data) in &self.networks {
            bytes_sent = bytes_sent.saturating_add(data.total_transmitted());
            bytes_recv = bytes_recv.saturating_add(data.total_received());
            packets_sent = packets_sent.saturating_add(data.total_packets_transmitted());
            packets_recv = packets_recv.saturating_add(data.total_packets_received());
        }

        let latency_ms = self.latency.sample(&mut self.rng).max(0.0);
        debug!(bytes_sent, bytes_recv, packets_sent, packets_recv, "collected network counters");

        Ok(Snapshot::empty()
            .metric(network::BYTES_SENT, bytes_sent as f64)
            .metric(network::BYTES_RECV, bytes_recv as f64)
            .metric(network::PACKETS_SENT, packets_sent as f64)
            .metric(network::PACKETS_RECV, packets_recv as f64)
            .metric(network::LATENCY_MS, latency_ms))
    }
}

/// Simulated power readings with a diurnal load curve: lower draw at night,
/// higher during the day, normal noise per component. Stands in until a real
/// power sensor implements [`MetricsSource`].
pub struct SimulatedPowerSource {
    total: Normal<f64>,
    cooling: Normal<f64>,
    network: Normal<f64>,
    auxiliary: Normal<f64>,
    rng: StdRng,
}

impl SimulatedPowerSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            total: normal(800.0, 100.0)?,
            cooling: normal(200.0, 30.0)?,
            network: normal(400.0, 50.0)?,
            auxiliary: normal(200.0, 30.0)?,
            rng: StdRng::from_entropy(),
        })
    }

    /// Time-of-day load factor: 0.7 + 0.6 * sin(π * hour / 12)
    fn time_factor() -> f64 {
        let hour = chrono::Local::now().hour() as f64;
        0.7 + 0.6 * (std::f64::consts::PI * hour / 12.0).sin()
    }
}

impl MetricsSource for SimulatedPowerSource {
    fn collect(&mut self) -> Result<Snapshot> {
        let factor = Self::time_factor();
        Ok(Snapshot::empty()
            .metric(energy::TOTAL_POWER, self.total.sample(&mut self.rng) * factor)
            .metric(energy::COOLING_POWER, self.cooling.sample(&mut self.rng) * factor)
            .metric(energy::NETWORK_POWER, self.network.sample(&mut self.rng) * factor)
            .metric(energy::AUXILIARY_POWER, self.auxiliary.sample(&mut self.rng) * factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_network_source_covers_all_keys() {
        let mut source = HostNetworkSource::new().unwrap();
        let snapshot = source.collect().unwrap();
        for key in crate::network::NetworkStatusService::METRIC_KEYS {
            assert!(snapshot.get(key).is_some(), "missing {key}");
        }
        assert!(snapshot.get(network::LATENCY_MS).unwrap() >= 0.0);
    }

    #[test]
    fn test_simulated_power_source_covers_all_keys() {
        let mut source = SimulatedPowerSource::new().unwrap();
        let snapshot = source.collect().unwrap();
        for key in crate::energy::EnergyEfficiencyService::METRIC_KEYS {
            assert!(snapshot.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_time_factor_bounds() {
        let factor = SimulatedPowerSource::time_factor();
        assert!((0.1..=1.3).contains(&factor));
    }

    #[test]
    fn test_bad_latency_profile_rejected() {
        assert!(HostNetworkSource::with_latency_profile(20.0, -1.0).is_err());
        assert!(HostNetworkSource::with_latency_profile(20.0, f64::NAN).is_err());
        assert!(HostNetworkSource::with_latency_profile(20.0, f64::INFINITY).is_err());
        assert!(HostNetworkSource::with_latency_profile(20.0, 0.0).is_ok());
    }
}
