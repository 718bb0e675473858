//! Efficiency recommendations and savings estimates
//!
//! Static recommendation records selected by threshold branch logic on the
//! current power snapshot, plus a rough annual-savings estimate.

use serde::{Deserialize, Serialize};

/// One actionable efficiency recommendation
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub category: &'static str,
    pub action: &'static str,
    pub potential_savings: &'static str,
    pub implementation_effort: &'static str,
    pub roi_timeline: &'static str,
}

/// Select recommendations from the current power profile.
///
/// `pue` is `None` when undefined (no IT load); PUE-gated recommendations
/// are skipped in that case.
pub fn efficiency_recommendations(
    pue: Option<f64>,
    total_power: f64,
    cooling_power: f64,
    auxiliary_power: f64,
    peak_power_threshold: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let cooling_fraction = if total_power > 0.0 {
        cooling_power / total_power
    } else {
        0.0
    };
    let auxiliary_fraction = if total_power > 0.0 {
        auxiliary_power / total_power
    } else {
        0.0
    };

    if pue.is_some_and(|p| p > 1.5) {
        recommendations.push(Recommendation {
            category: "Cooling",
            action: "Optimize cooling system settings",
            potential_savings: "10-15%",
            implementation_effort: "Medium",
            roi_timeline: "3-6 months",
        });
        if cooling_fraction > 0.3 {
            recommendations.push(Recommendation {
                category: "Cooling",
                action: "Investigate free cooling options or economizers",
                potential_savings: "15-25%",
                implementation_effort: "High",
                roi_timeline: "6-12 months",
            });
        }
    }

    if total_power > peak_power_threshold {
        recommendations.push(Recommendation {
            category: "Peak Power",
            action: "Implement load balancing to reduce peak power consumption",
            potential_savings: "5-10%",
            implementation_effort: "Medium",
            roi_timeline: "2-4 months",
        });
        recommendations.push(Recommendation {
            category: "Peak Power",
            action: "Stagger equipment startup to reduce inrush current",
            potential_savings: "3-5%",
            implementation_effort: "Low",
            roi_timeline: "1-2 months",
        });
    }

    if auxiliary_fraction > 0.3 {
        recommendations.push(Recommendation {
            category: "Auxiliary Systems",
            action: "Audit and optimize auxiliary power systems",
            potential_savings: "8-12%",
            implementation_effort: "Medium",
            roi_timeline: "3-5 months",
        });
        recommendations.push(Recommendation {
            category: "Auxiliary Systems",
            action: "Replace older equipment with energy-efficient models",
            potential_savings: "10-20%",
            implementation_effort: "High",
            roi_timeline: "12-24 months",
        });
    }

    // Standing recommendation, independent of the current profile
    recommendations.push(Recommendation {
        category: "Renewable Energy",
        action: "Explore solar power options for auxiliary systems",
        potential_savings: "20-30% of auxiliary power",
        implementation_effort: "High",
        roi_timeline: "24-36 months",
    });

    recommendations
}

/// Savings by category, annual USD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsBreakdown {
    pub cooling_optimization: f64,
    pub peak_power_management: f64,
    pub auxiliary_system_optimization: f64,
}

/// Estimated annual savings from implementing all applicable recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsEstimate {
    /// Annual energy cost at the current draw, USD
    pub baseline_annual_cost: f64,
    pub savings_breakdown: SavingsBreakdown,
    pub total_potential_savings: f64,
    pub savings_percentage: f64,
}

/// Estimate annual savings from the current power profile.
///
/// Gated by the same conditions as [`efficiency_recommendations`]:
/// cooling optimization 15% when PUE > 1.5, peak management 8% above the
/// peak threshold, auxiliary optimization 10% when auxiliary draw exceeds
/// 30% of total.
pub fn estimate_annual_savings(
    pue: Option<f64>,
    total_power: f64,
    auxiliary_power: f64,
    peak_power_threshold: f64,
    energy_cost_per_kwh: f64,
) -> SavingsEstimate {
    let daily_energy_kwh = total_power * 24.0 / 1000.0;
    let annual_energy_kwh = daily_energy_kwh * 365.0;
    let baseline_annual_cost = annual_energy_kwh * energy_cost_per_kwh;

    let cooling_optimization = if pue.is_some_and(|p| p > 1.5) {
        baseline_annual_cost * 0.15
    } else {
        0.0
    };
    let peak_power_management = if total_power > peak_power_threshold {
        baseline_annual_cost * 0.08
    } else {
        0.0
    };
    let auxiliary_system_optimization =
        if total_power > 0.0 && auxiliary_power / total_power > 0.3 {
            baseline_annual_cost * 0.10
        } else {
            0.0
        };

    let total_potential_savings =
        cooling_optimization + peak_power_management + auxiliary_system_optimization;
    let savings_percentage = if baseline_annual_cost > 0.0 {
        total_potential_savings / baseline_annual_cost * 100.0
    } else {
        0.0
    };

    SavingsEstimate {
        baseline_annual_cost,
        savings_breakdown: SavingsBreakdown {
            cooling_optimization,
            peak_power_management,
            auxiliary_system_optimization,
        },
        total_potential_savings,
        savings_percentage,
    }
}
