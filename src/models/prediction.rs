//! Prediction response models

use serde::Serialize;

use crate::decision::{Decision, Label, RiskTier};

/// Response body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: Label,
    pub probability: f64,
    pub risk_category: RiskTier,
}

impl PredictionResponse {
    pub fn new(probability: f64, decision: Decision) -> Self {
        Self {
            prediction: decision.label,
            probability,
            risk_category: decision.risk,
        }
    }
}
