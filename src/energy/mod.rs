//! Energy efficiency monitoring
//!
//! Tracks power-consumption readings, derives PUE/DCiE-style ratios, scores
//! anomalies over a rolling window of recent readings, and produces
//! efficiency recommendations with an annual-savings estimate.

mod recommendations;

pub use recommendations::{
    efficiency_recommendations, estimate_annual_savings, Recommendation, SavingsBreakdown,
    SavingsEstimate,
};

use crate::error::Result;
use crate::monitor::{
    MonitorConfig, MonitorPhase, RollingMonitor, RuleTarget, Snapshot, ThresholdCondition,
    ThresholdRule, Verdict,
};
use serde::{Deserialize, Serialize};

/// Total facility power draw, watts
pub const TOTAL_POWER: &str = "total_power";
/// Cooling system power draw, watts
pub const COOLING_POWER: &str = "cooling_power";
/// Network/IT equipment power draw, watts
pub const NETWORK_POWER: &str = "network_power";
/// Auxiliary systems power draw, watts
pub const AUXILIARY_POWER: &str = "auxiliary_power";

/// Derived: Power Usage Effectiveness (total / IT power)
pub const PUE: &str = "pue";
/// Derived: Data Center Infrastructure Efficiency, percent (100 / PUE)
pub const DCIE: &str = "dcie";
/// Derived: percent change of PUE vs the previous reading
pub const PUE_TREND: &str = "pue_trend";
/// Derived: cooling share of total power
pub const COOLING_FRACTION: &str = "cooling_fraction";
/// Derived: auxiliary share of total power
pub const AUXILIARY_FRACTION: &str = "auxiliary_fraction";

/// Configuration for the energy efficiency service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Rolling-window settings; default keeps the last 24 readings
    pub monitor: MonitorConfig,
    /// Peak power threshold in watts
    pub peak_power_threshold: f64,
    /// Cooling system efficiency (0..1), reported as-is
    pub cooling_efficiency: f64,
    /// Energy cost per kWh, USD, for savings estimates
    pub energy_cost_per_kwh: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default().with_capacity(24),
            peak_power_threshold: 1000.0,
            cooling_efficiency: 0.75,
            energy_cost_per_kwh: 0.12,
        }
    }
}

/// Point-in-time efficiency figures derived from the current snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub cooling_efficiency: f64,
    pub cooling_fraction: Option<f64>,
    pub auxiliary_fraction: Option<f64>,
}

/// Full energy-metrics payload: the monitor verdict plus ratios,
/// recommendations, and the savings estimate.
#[derive(Debug, Clone, Serialize)]
pub struct EnergyReport {
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Power Usage Effectiveness; `null` when IT power is zero
    pub pue: Option<f64>,
    /// DCiE percentage; `null` when PUE is undefined
    pub dcie: Option<f64>,
    /// Percent change of PUE vs the previous reading; `null` before the
    /// second reading or when either PUE is undefined
    pub pue_trend: Option<f64>,
    pub efficiency: EfficiencyMetrics,
    pub recommendations: Vec<Recommendation>,
    pub estimated_annual_savings: SavingsEstimate,
}

/// PUE of a single snapshot; undefined when IT power is not positive
fn pue_of(snapshot: &Snapshot) -> Option<f64> {
    let it_power = snapshot.get(NETWORK_POWER)?;
    let total_power = snapshot.get(TOTAL_POWER)?;
    if it_power <= 0.0 {
        None
    } else {
        Some(total_power / it_power)
    }
}

/// Share of total power drawn by one component; undefined when total is zero
fn fraction_of(snapshot: &Snapshot, component: &str) -> Option<f64> {
    let total = snapshot.get(TOTAL_POWER)?;
    let part = snapshot.get(component)?;
    if total <= 0.0 {
        None
    } else {
        Some(part / total)
    }
}

/// Energy monitoring service: a [`RollingMonitor`] over power readings with
/// PUE-family derived ratios and a peak-power threshold rule.
pub struct EnergyEfficiencyService {
    monitor: RollingMonitor,
    config: EnergyConfig,
}

impl EnergyEfficiencyService {
    /// All metric keys a power snapshot must carry
    pub const METRIC_KEYS: [&'static str; 4] =
        [TOTAL_POWER, COOLING_POWER, NETWORK_POWER, AUXILIARY_POWER];

    pub fn new(config: EnergyConfig) -> Result<Self> {
        let monitor = RollingMonitor::new(config.monitor.clone(), Self::METRIC_KEYS)?
            .with_derived(PUE, |ctx| pue_of(ctx.current))
            .with_derived(DCIE, |ctx| pue_of(ctx.current).map(|pue| 100.0 / pue))
            .with_derived(PUE_TREND, |ctx| {
                let current = pue_of(ctx.current)?;
                let previous = pue_of(ctx.previous)?;
                if previous == 0.0 {
                    None
                } else {
                    Some((current - previous) / previous * 100.0)
                }
            })
            .with_derived(COOLING_FRACTION, |ctx| {
                fraction_of(ctx.current, COOLING_POWER)
            })
            .with_derived(AUXILIARY_FRACTION, |ctx| {
                fraction_of(ctx.current, AUXILIARY_POWER)
            })
            .with_rule(ThresholdRule::new(
                "peak_power",
                RuleTarget::Metric(TOTAL_POWER.to_string()),
                ThresholdCondition::GreaterThan(config.peak_power_threshold),
                "Total power draw above peak threshold",
            ));
        Ok(Self { monitor, config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(EnergyConfig::default())
    }

    /// Record one power snapshot and build the full metrics report
    pub fn evaluate(&mut self, snapshot: Snapshot) -> Result<EnergyReport> {
        let pue = pue_of(&snapshot);
        let cooling_fraction = fraction_of(&snapshot, COOLING_POWER);
        let auxiliary_fraction = fraction_of(&snapshot, AUXILIARY_POWER);
        let total_power = snapshot.get(TOTAL_POWER).unwrap_or(0.0);
        let cooling_power = snapshot.get(COOLING_POWER).unwrap_or(0.0);
        let auxiliary_power = snapshot.get(AUXILIARY_POWER).unwrap_or(0.0);

        let verdict = self.monitor.record_and_evaluate(snapshot)?;

        let pue_trend = verdict
            .analysis
            .as_ref()
            .and_then(|a| a.derived.get(PUE_TREND).copied().flatten());

        Ok(EnergyReport {
            verdict,
            pue,
            dcie: pue.map(|p| 100.0 / p),
            pue_trend,
            efficiency: EfficiencyMetrics {
                cooling_efficiency: self.config.cooling_efficiency,
                cooling_fraction,
                auxiliary_fraction,
            },
            recommendations: efficiency_recommendations(
                pue,
                total_power,
                cooling_power,
                auxiliary_power,
                self.config.peak_power_threshold,
            ),
            estimated_annual_savings: estimate_annual_savings(
                pue,
                total_power,
                auxiliary_power,
                self.config.peak_power_threshold,
                self.config.energy_cost_per_kwh,
            ),
        })
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
    use crate::monitor::{Severity, Status};
    use chrono::{DateTime, Duration, Utc};
    use std::collections::BTreeMap;

    fn power_snapshot(offset_secs: i64, total: f64, cooling: f64, it: f64, aux: f64) -> Snapshot {
        let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        Snapshot::at(base + Duration::seconds(offset_secs), BTreeMap::new())
            .metric(TOTAL_POWER, total)
            .metric(COOLING_POWER, cooling)
            .metric(NETWORK_POWER, it)
            .metric(AUXILIARY_POWER, aux)
    }

    #[test]
    fn test_pue_and_dcie() {
        let mut service = EnergyEfficiencyService::with_defaults().unwrap();
        let report = service
            .evaluate(power_snapshot(0, 800.0, 200.0, 400.0, 200.0))
            .unwrap();
        assert_eq!(report.verdict.status, Status::Initializing);
        assert!((report.pue.unwrap() - 2.0).abs() < 1e-9);
        assert!((report.dcie.unwrap() - 50.0).abs() < 1e-9);
        assert!(report.pue_trend.is_none());
    }

    #[test]
    fn test_pue_undefined_without_it_load() {
        let mut service = EnergyEfficiencyService::with_defaults().unwrap();
        let report = service
            .evaluate(power_snapshot(0, 800.0, 200.0, 0.0, 200.0))
            .unwrap();
        assert!(report.pue.is_none());
        assert!(report.dcie.is_none());
    }

    #[test]
    fn test_pue_trend() {
        let mut service = EnergyEfficiencyService::with_defaults().unwrap();
        service
            .evaluate(power_snapshot(0, 800.0, 200.0, 400.0, 200.0))
            .unwrap();
        // PUE moves from 2.0 to 2.2: +10%
        let report = service
            .evaluate(power_snapshot(60, 880.0, 200.0, 400.0, 280.0))
            .unwrap();
        assert!((report.pue_trend.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_power_rule() {
        let mut service = EnergyEfficiencyService::with_defaults().unwrap();
        service
            .evaluate(power_snapshot(0, 800.0, 200.0, 400.0, 200.0))
            .unwrap();
        let report = service
            .evaluate(power_snapshot(60, 1200.0, 300.0, 600.0, 300.0))
            .unwrap();
        assert_eq!(report.verdict.status, Status::Warning);
        let alerts = report.verdict.alerts.unwrap();
        assert_eq!(alerts[0].rule, "peak_power");
    }

    #[test]
    fn test_anomalous_power_spike() {
        let mut service = EnergyEfficiencyService::with_defaults().unwrap();
        // Steady readings with mild variance, enough to activate detection
        let steady = [
            (800.0, 200.0),
            (810.0, 205.0),
            (790.0, 195.0),
            (805.0, 202.0),
            (795.0, 198.0),
            (800.0, 200.0),
        ];
        for (i, (total, cooling)) in steady.iter().enumerate() {
            service
                .evaluate(power_snapshot(i as i64 * 60, *total, *cooling, 400.0, 200.0))
                .unwrap();
        }
        // Cooling jumps far outside its window
        let report = service
            .evaluate(power_snapshot(600, 805.0, 500.0, 400.0, 200.0))
            .unwrap();
        let anomalies = report.verdict.anomalies.unwrap();
        assert!(anomalies.iter().any(|a| a.metric == COOLING_POWER));
        let cooling = anomalies.iter().find(|a| a.metric == COOLING_POWER).unwrap();
        assert_eq!(cooling.severity, Severity::High);
    }

    #[test]
    fn test_report_serialization_shape() {
        let mut service = EnergyEfficiencyService::with_defaults().unwrap();
        let report = service
            .evaluate(power_snapshot(0, 800.0, 200.0, 400.0, 200.0))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "initializing");
        // Initializing omits analysis/anomalies/alerts entirely
        assert!(json.get("analysis").is_none());
        assert!(json.get("alerts").is_none());
        assert!(json.get("recommendations").is_some());
        assert!(json["estimated_annual_savings"]["baseline_annual_cost"].is_number());
    }
}
