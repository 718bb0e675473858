//! Application state management

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::energy::EnergyEfficiencyService;
use crate::error::Result;
use crate::network::NetworkStatusService;
use crate::source::{HostNetworkSource, MetricsSource, SimulatedPowerSource};

use super::ServerConfig;

/// A metrics source paired with the service that evaluates its snapshots.
///
/// The monitor performs no internal locking, so each endpoint lives behind a
/// `tokio::sync::Mutex`: concurrent requests against the same monitor are
/// serialized here, and each `record_and_evaluate` call stays atomic.
pub struct MonitoredEndpoint<S> {
    pub source: Box<dyn MetricsSource>,
    pub service: S,
}

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub network: Mutex<MonitoredEndpoint<NetworkStatusService>>,
    pub energy: Mutex<MonitoredEndpoint<EnergyEfficiencyService>>,
    network_evaluations: AtomicU64,
    energy_evaluations: AtomicU64,
}

impl AppState {
    /// State with the default sources: host network counters and the
    /// simulated power feed
    pub fn new(config: ServerConfig) -> Result<Self> {
        let network_source = Box::new(HostNetworkSource::new()?);
        let power_source = Box::new(SimulatedPowerSource::new()?);
        Self::with_sources(config, network_source, power_source)
    }

    /// State with injected sources, e.g. real sensors or test fixtures
    pub fn with_sources(
        config: ServerConfig,
        network_source: Box<dyn MetricsSource>,
        power_source: Box<dyn MetricsSource>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            started_at: chrono::Utc::now(),
            network: Mutex::new(MonitoredEndpoint {
                source: network_source,
                service: NetworkStatusService::with_defaults()?,
            }),
            energy: Mutex::new(MonitoredEndpoint {
                source: power_source,
                service: EnergyEfficiencyService::with_defaults()?,
            }),
            network_evaluations: AtomicU64::new(0),
            energy_evaluations: AtomicU64::new(0),
        })
    }

    pub fn record_network_evaluation(&self) {
        self.network_evaluations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_energy_evaluation(&self) {
        self.energy_evaluations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn network_evaluations(&self) -> u64 {
        self.network_evaluations.load(Ordering::SeqCst)
    }

    pub fn energy_evaluations(&self) -> u64 {
        self.energy_evaluations.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
