//! Decision Policy
//!
//! Maps a readmission probability to a binary label using the threshold
//! stored with the model, and to a risk tier using fixed cutoffs.

use std::fmt;

use serde::Serialize;

/// Probabilities below this are low risk
pub const LOW_RISK_CUTOFF: f64 = 0.3;

/// Probabilities at or above this are high risk
pub const HIGH_RISK_CUTOFF: f64 = 0.6;

/// Binary outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Readmitted,
    #[serde(rename = "Not Readmitted")]
    NotReadmitted,
}

impl Label {
    /// Positive when `probability >= threshold`
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Label::Readmitted
        } else {
            Label::NotReadmitted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Readmitted => "Readmitted",
            Label::NotReadmitted => "Not Readmitted",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse risk bucket, independent of the decision threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability < LOW_RISK_CUTOFF {
            RiskTier::Low
        } else if probability < HIGH_RISK_CUTOFF {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the decision policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub label: Label,
    pub risk: RiskTier,
}

pub fn decide(probability: f64, threshold: f64) -> Decision {
    Decision {
        label: Label::from_probability(probability, threshold),
        risk: RiskTier::from_probability(probability),
    }
}
