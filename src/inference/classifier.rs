//! Classifier artifacts

use serde::{Deserialize, Serialize};

use super::{Classifier, InferenceError};

/// Linear model over encoded features with a logistic link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, encoded: &[f64]) -> Result<f64, InferenceError> {
        if encoded.len() != self.coefficients.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: encoded.len(),
            });
        }

        let logit = self.intercept
            + self
                .coefficients
                .iter()
                .zip(encoded)
                .map(|(w, x)| w * x)
                .sum::<f64>();

        Ok(sigmoid(logit))
    }

    fn input_width(&self) -> usize {
        self.coefficients.len()
    }
}

/// Classifier artifact, tagged by model kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
}

impl Classifier for ClassifierArtifact {
    fn predict_proba(&self, encoded: &[f64]) -> Result<f64, InferenceError> {
        match self {
            ClassifierArtifact::LogisticRegression(model) => model.predict_proba(encoded),
        }
    }

    fn input_width(&self) -> usize {
        match self {
            ClassifierArtifact::LogisticRegression(model) => model.input_width(),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    // split on sign so exp never overflows
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
