//! Monitor configuration

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a [`RollingMonitor`](super::RollingMonitor).
///
/// All fields have defaults; construction of a monitor validates the
/// configuration and fails fast on contract violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Maximum number of retained snapshots (FIFO eviction beyond this)
    pub capacity: usize,
    /// Minimum number of prior snapshots required before z-score anomaly
    /// detection activates
    pub min_history: usize,
    /// Absolute z-score above which a metric is flagged anomalous
    pub anomaly_z_threshold: f64,
    /// Absolute z-score above which an anomaly is High severity instead of
    /// Medium
    pub high_severity_z_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            min_history: 5,
            anomaly_z_threshold: 2.0,
            high_severity_z_threshold: 3.0,
        }
    }
}

impl MonitorConfig {
    /// Set the history capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the minimum history length for anomaly detection
    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    /// Set the anomaly and high-severity z-score thresholds
    pub fn with_z_thresholds(mut self, anomaly: f64, high_severity: f64) -> Self {
        self.anomaly_z_threshold = anomaly;
        self.high_severity_z_threshold = high_severity;
        self
    }

    /// Validate contract invariants.
    ///
    /// `capacity` must be at least 2 (a rate of change needs two points) and
    /// at least `min_history`, so that once anomaly detection activates,
    /// FIFO eviction can never deactivate it.
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 2 {
            return Err(MonitorError::Configuration(format!(
                "capacity must be >= 2, got {}",
                self.capacity
            )));
        }
        if self.capacity < self.min_history {
            return Err(MonitorError::Configuration(format!(
                "capacity ({}) must be >= min_history ({})",
                self.capacity, self.min_history
            )));
        }
        Ok(())
    }
}
