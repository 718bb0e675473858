//! Rolling Metrics Monitor
//!
//! The reusable monitoring core: bounded snapshot history, rate and ratio
//! derivation, z-score anomaly scoring, and threshold alerting.

mod config;
mod rolling;
mod rules;
mod snapshot;

pub use config::MonitorConfig;
pub use rolling::{
    Analysis, Anomaly, DerivedContext, MonitorPhase, RollingMonitor, Severity, Status, Verdict,
};
pub use rules::{RuleTarget, ThresholdAlert, ThresholdCondition, ThresholdRule};
pub use snapshot::Snapshot;
