//! Infrawatch - Infrastructure metrics monitoring
//!
//! This crate provides a monitoring service for infrastructure dashboards:
//! - [`monitor`] - Rolling-window statistical monitoring: bounded snapshot
//!   history, z-score anomaly scoring, threshold alerting
//! - [`network`] - Network status service (traffic rates, packet loss,
//!   latency)
//! - [`energy`] - Energy efficiency service (PUE/DCiE ratios, anomaly
//!   detection, recommendations)
//! - [`source`] - Pluggable metrics sources (host counters, simulated power
//!   feed)
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Monitoring core
pub mod monitor;

// Domain services
pub mod energy;
pub mod network;

// Metrics sources
pub mod source;

// Services
pub mod cli;
pub mod server;

pub use error::{MonitorError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{MonitorError, Result};

    // Monitoring core
    pub use crate::monitor::{
        Analysis, Anomaly, MonitorConfig, MonitorPhase, RollingMonitor, RuleTarget, Severity,
        Snapshot, Status, ThresholdAlert, ThresholdCondition, ThresholdRule, Verdict,
    };

    // Domain services
    pub use crate::energy::{EnergyConfig, EnergyEfficiencyService, EnergyReport};
    pub use crate::network::{NetworkStatusService, NetworkThresholds};

    // Metrics sources
    pub use crate::source::{HostNetworkSource, MetricsSource, SimulatedPowerSource};

    // Server
    pub use crate::server::{create_router, AppState, ServerConfig};
}
