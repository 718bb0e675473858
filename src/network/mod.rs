//! Network status monitoring
//!
//! Tracks interface traffic counters and latency, derives bandwidth usage
//! and packet-loss rate, and raises threshold alerts for lossy or slow links.

use crate::error::Result;
use crate::monitor::{
    MonitorConfig, MonitorPhase, RollingMonitor, RuleTarget, Snapshot, ThresholdCondition,
    ThresholdRule, Verdict,
};
use serde::{Deserialize, Serialize};

/// Cumulative bytes sent across interfaces
pub const BYTES_SENT: &str = "bytes_sent";
/// Cumulative bytes received across interfaces
pub const BYTES_RECV: &str = "bytes_recv";
/// Cumulative packets sent across interfaces
pub const PACKETS_SENT: &str = "packets_sent";
/// Cumulative packets received across interfaces
pub const PACKETS_RECV: &str = "packets_recv";
/// Round-trip latency in milliseconds
pub const LATENCY_MS: &str = "latency_ms";

/// Derived: received-bytes rate per second
pub const BANDWIDTH_USAGE: &str = "bandwidth_usage";
/// Derived: 1 - packets_recv / packets_sent, undefined with no traffic
pub const PACKET_LOSS_RATE: &str = "packet_loss_rate";

/// Alert thresholds for the network service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkThresholds {
    /// Packet-loss ratio above which to alert (0..1)
    pub packet_loss_rate: f64,
    /// Latency in milliseconds above which to alert
    pub latency_ms: f64,
}

impl Default for NetworkThresholds {
    fn default() -> Self {
        Self {
            packet_loss_rate: 0.8,
            latency_ms: 50.0,
        }
    }
}

/// Network monitoring service: a [`RollingMonitor`] over traffic counters
/// with loss/latency threshold rules.
pub struct NetworkStatusService {
    monitor: RollingMonitor,
}

impl NetworkStatusService {
    /// All metric keys a network snapshot must carry
    pub const METRIC_KEYS: [&'static str; 5] =
        [BYTES_SENT, BYTES_RECV, PACKETS_SENT, PACKETS_RECV, LATENCY_MS];

    pub fn new(config: MonitorConfig, thresholds: NetworkThresholds) -> Result<Self> {
        let monitor = RollingMonitor::new(config, Self::METRIC_KEYS)?
            .with_derived(BANDWIDTH_USAGE, |ctx| {
                let dt = ctx.elapsed_secs?;
                let current = ctx.current.get(BYTES_RECV)?;
                let previous = ctx.previous.get(BYTES_RECV)?;
                Some((current - previous) / dt)
            })
            .with_derived(PACKET_LOSS_RATE, |ctx| {
                let sent = ctx.current.get(PACKETS_SENT)?;
                let recv = ctx.current.get(PACKETS_RECV)?;
                // No traffic yet: the ratio is undefined, not an error
                if sent <= 0.0 {
                    None
                } else {
                    Some(1.0 - recv / sent)
                }
            })
            .with_rule(ThresholdRule::new(
                "high_packet_loss",
                RuleTarget::Derived(PACKET_LOSS_RATE.to_string()),
                ThresholdCondition::GreaterThan(thresholds.packet_loss_rate),
                "High packet loss detected",
            ))
            .with_rule(ThresholdRule::new(
                "high_latency",
                RuleTarget::Metric(LATENCY_MS.to_string()),
                ThresholdCondition::GreaterThan(thresholds.latency_ms),
                "High network latency detected",
            ));
        Ok(Self { monitor })
    }

    /// Service with default window (last 100 records) and thresholds
    pub fn with_defaults() -> Result<Self> {
        Self::new(MonitorConfig::default(), NetworkThresholds::default())
    }

    /// Record one traffic snapshot and evaluate it
    pub fn evaluate(&mut self, snapshot: Snapshot) -> Result<Verdict> {
        self.monitor.record_and_evaluate(snapshot)
    }

    pub fn phase(&self) -> MonitorPhase {
        self.monitor.phase()
    }

    pub fn history_len(&self) -> usize {
        self.monitor.history_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Status;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::BTreeMap;

    fn traffic_snapshot(
        offset_secs: i64,
        bytes_recv: f64,
        packets_sent: f64,
        packets_recv: f64,
        latency_ms: f64,
    ) -> Snapshot {
        let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        Snapshot::at(base + Duration::seconds(offset_secs), BTreeMap::new())
            .metric(BYTES_SENT, 1_000.0)
            .metric(BYTES_RECV, bytes_recv)
            .metric(PACKETS_SENT, packets_sent)
            .metric(PACKETS_RECV, packets_recv)
            .metric(LATENCY_MS, latency_ms)
    }

    #[test]
    fn test_bandwidth_and_loss_derivation() {
        let mut service = NetworkStatusService::with_defaults().unwrap();
        service
            .evaluate(traffic_snapshot(0, 1_000.0, 100.0, 99.0, 20.0))
            .unwrap();
        let verdict = service
            .evaluate(traffic_snapshot(2, 3_000.0, 200.0, 190.0, 20.0))
            .unwrap();
        let analysis = verdict.analysis.unwrap();
        let bandwidth = analysis.derived.get(BANDWIDTH_USAGE).copied().flatten().unwrap();
        assert!((bandwidth - 1_000.0).abs() < 1e-9);
        let loss = analysis.derived.get(PACKET_LOSS_RATE).copied().flatten().unwrap();
        assert!((loss - 0.05).abs() < 1e-9);
        assert_eq!(verdict.status, Status::Normal);
    }

    #[test]
    fn test_packet_loss_alert() {
        let mut service = NetworkStatusService::with_defaults().unwrap();
        service
            .evaluate(traffic_snapshot(0, 1_000.0, 100.0, 99.0, 20.0))
            .unwrap();
        // 90% loss on the second snapshot
        let verdict = service
            .evaluate(traffic_snapshot(1, 1_100.0, 1_000.0, 100.0, 20.0))
            .unwrap();
        assert_eq!(verdict.status, Status::Warning);
        let alerts = verdict.alerts.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "High packet loss detected");
    }

    #[test]
    fn test_latency_alert() {
        let mut service = NetworkStatusService::with_defaults().unwrap();
        service
            .evaluate(traffic_snapshot(0, 1_000.0, 100.0, 99.0, 20.0))
            .unwrap();
        let verdict = service
            .evaluate(traffic_snapshot(1, 1_100.0, 200.0, 198.0, 80.0))
            .unwrap();
        assert_eq!(verdict.status, Status::Warning);
        let alerts = verdict.alerts.unwrap();
        assert_eq!(alerts[0].message, "High network latency detected");
    }

    #[test]
    fn test_zero_traffic_loss_undefined() {
        let mut service = NetworkStatusService::with_defaults().unwrap();
        service
            .evaluate(traffic_snapshot(0, 0.0, 0.0, 0.0, 20.0))
            .unwrap();
        let verdict = service
            .evaluate(traffic_snapshot(1, 0.0, 0.0, 0.0, 20.0))
            .unwrap();
        let analysis = verdict.analysis.unwrap();
        // 0/0 packets: reported as undefined rather than raising
        assert_eq!(analysis.derived.get(PACKET_LOSS_RATE), Some(&None));
        // And the loss rule must not fire on an undefined ratio
        assert_eq!(verdict.status, Status::Normal);
    }
}
