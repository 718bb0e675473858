//! Metric snapshots
//!
//! A [`Snapshot`] is one timestamped reading of named numeric metrics,
//! produced once per poll cycle by a metrics source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable mapping of metric name to numeric value, captured at a point
/// in time.
///
/// Serializes with the metric values at the top level next to `timestamp`,
/// matching the wire shape consumed by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Capture timestamp (UTC)
    pub timestamp: DateTime<Utc>,
    /// Metric name → value
    #[serde(flatten)]
    values: BTreeMap<String, f64>,
}

impl Snapshot {
    /// Create a snapshot captured now
    pub fn new(values: BTreeMap<String, f64>) -> Self {
        Self::at(Utc::now(), values)
    }

    /// Create a snapshot with an explicit capture timestamp
    pub fn at(timestamp: DateTime<Utc>, values: BTreeMap<String, f64>) -> Self {
        Self { timestamp, values }
    }

    /// Create an empty snapshot captured now; populate with [`Snapshot::metric`]
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    /// Add or replace a metric value (builder-style)
    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Look up a metric value by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterate over (name, value) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Number of metrics in the snapshot
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot carries no metrics
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Seconds elapsed since an earlier snapshot, if this one is strictly later
    pub fn elapsed_since(&self, earlier: &Snapshot) -> Option<f64> {
        let millis = self
            .timestamp
            .signed_duration_since(earlier.timestamp)
            .num_milliseconds();
        if millis > 0 {
            Some(millis as f64 / 1000.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_builder_and_lookup() {
        let snap = Snapshot::empty().metric("cpu", 42.0).metric("mem", 80.5);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get("cpu"), Some(42.0));
        assert_eq!(snap.get("disk"), None);
    }

    #[test]
    fn test_elapsed_since() {
        let earlier = Snapshot::empty();
        let later = Snapshot::at(earlier.timestamp + Duration::seconds(5), BTreeMap::new());
        assert_eq!(later.elapsed_since(&earlier), Some(5.0));
        // Equal or reversed timestamps yield no elapsed time
        assert_eq!(earlier.elapsed_since(&later), None);
    }

    #[test]
    fn test_serializes_values_flattened() {
        let snap = Snapshot::empty().metric("total_power", 800.0);
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.get("timestamp").is_some());
        assert_eq!(json.get("total_power").unwrap().as_f64(), Some(800.0));
    }
}
