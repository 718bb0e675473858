//! Rolling metrics monitor
//!
//! Maintains a bounded FIFO window of historical metric snapshots and, on
//! each new snapshot, produces a [`Verdict`]: is the system operating
//! normally, still warming up, or past an alert threshold.
//!
//! Anomaly scoring uses the trailing window *excluding* the newest snapshot,
//! so an observation never dilutes its own z-score.

use crate::error::{MonitorError, Result};
use crate::monitor::config::MonitorConfig;
use crate::monitor::rules::{RuleTarget, ThresholdAlert, ThresholdRule};
use crate::monitor::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Per-call verdict status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// First snapshot ever; no prior point to compare against
    Initializing,
    /// No anomaly and no threshold rule fired
    Normal,
    /// At least one anomaly or threshold alert fired
    Warning,
}

/// Anomaly severity. Two tiers by design; there is no critical/fatal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
}

/// A metric whose current value deviates anomalously from its trailing window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// Metric name
    pub metric: String,
    /// The newest observed value
    pub current_value: f64,
    /// Mean over the trailing window (newest excluded)
    pub historical_mean: f64,
    /// Normalized deviation: (current - mean) / std
    pub z_score: f64,
    /// High when |z| exceeds the high-severity threshold, Medium otherwise
    pub severity: Severity,
}

/// Derived analysis for a single evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    /// Per-metric rate of change per second vs the immediately preceding
    /// snapshot. `null` when the elapsed time is zero or non-positive.
    pub rates: BTreeMap<String, Option<f64>>,
    /// Named domain values (ratios, passthroughs) registered on the monitor.
    /// `null` marks a soft-failed computation such as a zero denominator.
    pub derived: BTreeMap<String, Option<f64>>,
}

/// The monitor's per-call output.
///
/// `analysis`, `anomalies`, and `alerts` are omitted from serialization while
/// the monitor is initializing (first call), when no comparison is defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: Status,
    /// The raw snapshot this verdict describes
    pub metrics: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<Anomaly>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<ThresholdAlert>>,
}

impl Verdict {
    /// Whether any anomaly or threshold alert fired
    pub fn is_warning(&self) -> bool {
        self.status == Status::Warning
    }
}

/// Observable monitor lifecycle phase, derived from history length.
/// Transitions are monotonic: Uninitialized → Warming → Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorPhase {
    /// History empty
    Uninitialized,
    /// Some history, but not enough for anomaly detection; threshold rules
    /// still fire
    Warming,
    /// Full detection active
    Active,
}

/// Inputs available to a derived-metric computation
pub struct DerivedContext<'a> {
    /// The snapshot being evaluated
    pub current: &'a Snapshot,
    /// The immediately preceding snapshot
    pub previous: &'a Snapshot,
    /// Seconds between the two, when positive
    pub elapsed_secs: Option<f64>,
}

type DerivedFn = Box<dyn Fn(&DerivedContext) -> Option<f64> + Send + Sync>;

/// Rolling-window statistical monitor with threshold alerting.
///
/// Single-threaded per instance: `record_and_evaluate` mutates the history
/// and performs no internal locking. Callers sharing one monitor across
/// tasks must serialize access (the HTTP layer wraps each service in a
/// `tokio::sync::Mutex`). Independent instances share nothing.
pub struct RollingMonitor {
    config: MonitorConfig,
    metric_keys: Vec<String>,
    derived: Vec<(String, DerivedFn)>,
    rules: Vec<ThresholdRule>,
    history: VecDeque<Snapshot>,
}

impl RollingMonitor {
    /// Create a monitor tracking the given metric keys.
    ///
    /// Fails fast with [`MonitorError::Configuration`] when the configuration
    /// violates its contract (`capacity >= 2`, `capacity >= min_history`).
    pub fn new<I, S>(config: MonitorConfig, metric_keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;
        let capacity = config.capacity;
        Ok(Self {
            config,
            metric_keys: metric_keys.into_iter().map(Into::into).collect(),
            derived: Vec::new(),
            rules: Vec::new(),
            history: VecDeque::with_capacity(capacity),
        })
    }

    /// Register a named derived value computed on every evaluation.
    /// Returning `None` reports the value as undefined rather than failing.
    pub fn with_derived<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&DerivedContext) -> Option<f64> + Send + Sync + 'static,
    {
        self.derived.push((name.into(), Box::new(compute)));
        self
    }

    /// Register a threshold rule evaluated on every non-initializing call
    pub fn with_rule(mut self, rule: ThresholdRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> MonitorPhase {
        if self.history.is_empty() {
            MonitorPhase::Uninitialized
        } else if self.history.len() < self.config.min_history {
            MonitorPhase::Warming
        } else {
            MonitorPhase::Active
        }
    }

    /// Number of retained snapshots
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Retained snapshots, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Snapshot> {
        self.history.iter()
    }

    /// The configuration this monitor was built with
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Metric keys this monitor tracks
    pub fn metric_keys(&self) -> &[String] {
        &self.metric_keys
    }

    /// Append a snapshot to the history and evaluate it.
    ///
    /// Every configured metric key must be present in the snapshot; a missing
    /// key is an error rather than an implicit zero, which would corrupt the
    /// window statistics. "Not enough data yet" is not an error: the first
    /// call yields `initializing`, and calls before `min_history` is reached
    /// simply report no anomalies.
    pub fn record_and_evaluate(&mut self, snapshot: Snapshot) -> Result<Verdict> {
        for key in &self.metric_keys {
            if snapshot.get(key).is_none() {
                return Err(MonitorError::MissingMetric(key.clone()));
            }
        }

        let Some(previous) = self.history.back() else {
            // First call ever: no previous point, so no rates, ratios, or
            // anomaly scoring are defined.
            debug!(metrics = snapshot.len(), "first snapshot recorded, monitor initializing");
            self.history.push_back(snapshot.clone());
            return Ok(Verdict {
                status: Status::Initializing,
                metrics: snapshot,
                analysis: None,
                anomalies: None,
                alerts: None,
            });
        };

        let elapsed = snapshot.elapsed_since(previous);

        let mut rates = BTreeMap::new();
        for key in &self.metric_keys {
            let rate = match (elapsed, snapshot.get(key), previous.get(key)) {
                (Some(dt), Some(current), Some(prev)) => Some((current - prev) / dt),
                _ => None,
            };
            rates.insert(key.clone(), rate);
        }

        let ctx = DerivedContext {
            current: &snapshot,
            previous,
            elapsed_secs: elapsed,
        };
        let mut derived = BTreeMap::new();
        for (name, compute) in &self.derived {
            derived.insert(name.clone(), compute(&ctx));
        }

        // Anomaly scoring against the window as it stood before this call,
        // gated until the window is large enough for the sample standard
        // deviation to mean anything.
        let mut anomalies = Vec::new();
        if self.history.len() >= self.config.min_history {
            for key in &self.metric_keys {
                let Some(current) = snapshot.get(key) else {
                    continue;
                };
                let values: Vec<f64> =
                    self.history.iter().filter_map(|s| s.get(key)).collect();
                let (mean, std) = mean_std(&values);
                // A zero-variance window yields no anomaly signal: z is
                // defined as 0, not a division error.
                let z_score = if std > 0.0 { (current - mean) / std } else { 0.0 };
                if z_score.abs() > self.config.anomaly_z_threshold {
                    let severity = if z_score.abs() > self.config.high_severity_z_threshold {
                        Severity::High
                    } else {
                        Severity::Medium
                    };
                    debug!(
                        metric = %key,
                        z_score,
                        current,
                        mean,
                        ?severity,
                        "anomalous metric detected"
                    );
                    anomalies.push(Anomaly {
                        metric: key.clone(),
                        current_value: current,
                        historical_mean: mean,
                        z_score,
                        severity,
                    });
                }
            }
        }

        // Threshold rules fire independently of anomaly detection and are
        // active even while warming up.
        let mut alerts = Vec::new();
        for rule in &self.rules {
            let value = match &rule.target {
                RuleTarget::Metric(key) => snapshot.get(key),
                RuleTarget::Derived(name) => derived
                    .get(name)
                    .copied()
                    .flatten()
                    .or_else(|| rates.get(name).copied().flatten()),
            };
            if let Some(value) = value {
                if rule.condition.evaluate(value) {
                    alerts.push(ThresholdAlert {
                        rule: rule.name.clone(),
                        message: rule.message.clone(),
                        value,
                    });
                }
            }
        }

        let status = if anomalies.is_empty() && alerts.is_empty() {
            Status::Normal
        } else {
            Status::Warning
        };

        self.history.push_back(snapshot.clone());
        if self.history.len() > self.config.capacity {
            self.history.pop_front();
        }

        Ok(Verdict {
            status,
            metrics: snapshot,
            analysis: Some(Analysis { rates, derived }),
            anomalies: Some(anomalies),
            alerts: Some(alerts),
        })
    }
}

/// Mean and (population) standard deviation of a slice of values
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::rules::ThresholdCondition;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::BTreeMap;

    fn snap_at(offset_secs: i64, value: f64) -> Snapshot {
        let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        Snapshot::at(base + Duration::seconds(offset_secs), BTreeMap::new()).metric("x", value)
    }

    fn monitor(config: MonitorConfig) -> RollingMonitor {
        RollingMonitor::new(config, ["x"]).unwrap()
    }

    #[test]
    fn test_first_call_initializing() {
        let mut m = monitor(MonitorConfig::default());
        let verdict = m.record_and_evaluate(snap_at(0, 1.0)).unwrap();
        assert_eq!(verdict.status, Status::Initializing);
        assert!(verdict.analysis.is_none());
        assert!(verdict.alerts.is_none());
        assert_eq!(m.phase(), MonitorPhase::Warming);
    }

    #[test]
    fn test_missing_metric_is_error() {
        let mut m = monitor(MonitorConfig::default());
        let empty = Snapshot::empty();
        let err = m.record_and_evaluate(empty).unwrap_err();
        assert!(matches!(err, MonitorError::MissingMetric(ref k) if k == "x"));
        // Failed calls must not mutate history
        assert_eq!(m.history_len(), 0);
    }

    #[test]
    fn test_rate_of_change() {
        let mut m = monitor(MonitorConfig::default());
        m.record_and_evaluate(snap_at(0, 100.0)).unwrap();
        let verdict = m.record_and_evaluate(snap_at(10, 200.0)).unwrap();
        let analysis = verdict.analysis.unwrap();
        let rate = analysis.rates.get("x").copied().flatten().unwrap();
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_derived_soft_undefined() {
        let config = MonitorConfig::default();
        let mut m = RollingMonitor::new(config, ["x"])
            .unwrap()
            .with_derived("inverse", |ctx| {
                let x = ctx.current.get("x")?;
                if x == 0.0 {
                    None
                } else {
                    Some(1.0 / x)
                }
            });
        m.record_and_evaluate(snap_at(0, 2.0)).unwrap();
        let verdict = m.record_and_evaluate(snap_at(1, 0.0)).unwrap();
        let analysis = verdict.analysis.unwrap();
        assert_eq!(analysis.derived.get("inverse"), Some(&None));
    }

    #[test]
    fn test_rule_fires_while_warming() {
        let mut m = monitor(MonitorConfig::default()).with_rule(ThresholdRule::new(
            "x_high",
            RuleTarget::Metric("x".to_string()),
            ThresholdCondition::GreaterThan(50.0),
            "x is too high",
        ));
        m.record_and_evaluate(snap_at(0, 10.0)).unwrap();
        let verdict = m.record_and_evaluate(snap_at(1, 75.0)).unwrap();
        assert_eq!(verdict.status, Status::Warning);
        let alerts = verdict.alerts.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule, "x_high");
        assert_eq!(alerts[0].value, 75.0);
        // Anomaly detection is still inactive this early
        assert!(verdict.anomalies.unwrap().is_empty());
    }

    #[test]
    fn test_eviction_keeps_last_capacity() {
        let config = MonitorConfig::default().with_capacity(3).with_min_history(2);
        let mut m = monitor(config);
        for i in 0..5 {
            m.record_and_evaluate(snap_at(i, i as f64)).unwrap();
        }
        assert_eq!(m.history_len(), 3);
        let retained: Vec<f64> = m.history().map(|s| s.get("x").unwrap()).collect();
        assert_eq!(retained, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_anomaly_detection_after_warmup() {
        let config = MonitorConfig::default().with_capacity(10).with_min_history(3);
        let mut m = monitor(config);
        // Window with real variance, then a far outlier
        for (i, v) in [10.0, 12.0, 8.0, 11.0].iter().enumerate() {
            let verdict = m.record_and_evaluate(snap_at(i as i64, *v)).unwrap();
            assert_ne!(verdict.status, Status::Warning);
        }
        let verdict = m.record_and_evaluate(snap_at(10, 100.0)).unwrap();
        assert_eq!(verdict.status, Status::Warning);
        let anomalies = verdict.anomalies.unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].metric, "x");
        assert_eq!(anomalies[0].severity, Severity::High);
        assert!(anomalies[0].z_score > 3.0);
    }

    #[test]
    fn test_phase_transitions_monotonic() {
        let config = MonitorConfig::default().with_capacity(5).with_min_history(3);
        let mut m = monitor(config);
        assert_eq!(m.phase(), MonitorPhase::Uninitialized);
        m.record_and_evaluate(snap_at(0, 1.0)).unwrap();
        assert_eq!(m.phase(), MonitorPhase::Warming);
        m.record_and_evaluate(snap_at(1, 1.0)).unwrap();
        m.record_and_evaluate(snap_at(2, 1.0)).unwrap();
        assert_eq!(m.phase(), MonitorPhase::Active);
        // Eviction never drops back below Active once reached
        for i in 3..20 {
            m.record_and_evaluate(snap_at(i, 1.0)).unwrap();
            assert_eq!(m.phase(), MonitorPhase::Active);
        }
    }

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((mean - 5.0).abs() < 1e-9);
        assert!((std - 2.0).abs() < 1e-9);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }
}
