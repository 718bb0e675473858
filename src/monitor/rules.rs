//! Threshold rules
//!
//! Domain-specific comparison checks evaluated on every snapshot,
//! independent of z-score anomaly detection.

use serde::{Deserialize, Serialize};

/// Condition that triggers a threshold rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThresholdCondition {
    /// Value exceeds threshold
    GreaterThan(f64),
    /// Value falls below threshold
    LessThan(f64),
    /// Value is outside the given range [low, high]
    OutOfRange(f64, f64),
}

impl ThresholdCondition {
    /// Evaluate the condition against a value
    pub fn evaluate(&self, value: f64) -> bool {
        match self {
            ThresholdCondition::GreaterThan(threshold) => value > *threshold,
            ThresholdCondition::LessThan(threshold) => value < *threshold,
            ThresholdCondition::OutOfRange(low, high) => value < *low || value > *high,
        }
    }
}

/// What a rule is evaluated against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuleTarget {
    /// A raw metric value from the current snapshot
    Metric(String),
    /// A named derived analysis value (rate, ratio)
    Derived(String),
}

/// A named threshold check with a human-readable alert message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// Unique rule name
    pub name: String,
    /// Value the rule inspects
    pub target: RuleTarget,
    /// Trigger condition
    pub condition: ThresholdCondition,
    /// Message emitted when the rule fires
    pub message: String,
}

impl ThresholdRule {
    pub fn new(
        name: impl Into<String>,
        target: RuleTarget,
        condition: ThresholdCondition,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            condition,
            message: message.into(),
        }
    }
}

/// A fired threshold rule, reported in a verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdAlert {
    /// Name of the rule that fired
    pub rule: String,
    /// Human-readable alert message
    pub message: String,
    /// The value that triggered the rule
    pub value: f64,
}
