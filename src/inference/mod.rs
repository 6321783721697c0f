//! Inference Engine
//!
//! The classifier and the preprocessor are produced by the training
//! pipeline. This module only evaluates them: the preprocessor encodes a
//! [`FeatureRow`] into a dense vector, the classifier turns that vector into
//! the probability of the positive class.

pub mod classifier;
pub mod preprocessor;

pub use classifier::ClassifierArtifact;
pub use preprocessor::{ColumnTransformer, HandleUnknown};

use crate::features::FeatureRow;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("missing feature: {0}")]
    MissingFeature(String),

    #[error("feature {column} has unexpected type, expected {expected}")]
    WrongType {
        column: String,
        expected: &'static str,
    },

    #[error("unknown category {value:?} for feature {column}")]
    UnknownCategory { column: String, value: String },

    #[error("expected {expected} encoded features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("classifier produced invalid probability {0}")]
    InvalidProbability(f64),
}

/// Output of a [`Preprocessor`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoded {
    pub values: Vec<f64>,
    /// Columns whose category was unseen in training and encoded as zeros
    pub unknown_categories: Vec<String>,
}

/// A scored row
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub probability: f64,
    pub unknown_categories: Vec<String>,
}

/// Encodes a feature row into the classifier's input space
pub trait Preprocessor: Send + Sync {
    fn transform(&self, row: &FeatureRow) -> Result<Encoded, InferenceError>;

    /// Number of values produced by [`Preprocessor::transform`]
    fn output_width(&self) -> usize;
}

/// Binary classifier over encoded features
pub trait Classifier: Send + Sync {
    /// Probability of the positive class
    fn predict_proba(&self, encoded: &[f64]) -> Result<f64, InferenceError>;

    /// Number of encoded features the classifier expects
    fn input_width(&self) -> usize;
}

/// Encode `row` and score it, checking the result is a probability
pub fn predict_proba(
    preprocessor: &dyn Preprocessor,
    classifier: &dyn Classifier,
    row: &FeatureRow,
) -> Result<Scored, InferenceError> {
    let encoded = preprocessor.transform(row)?;
    let probability = classifier.predict_proba(&encoded.values)?;

    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(InferenceError::InvalidProbability(probability));
    }

    Ok(Scored {
        probability,
        unknown_categories: encoded.unknown_categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClassifier, NullPreprocessor};

    #[test]
    fn test_rejects_out_of_range_probability() {
        let row = FeatureRow::default();
        let err = predict_proba(&NullPreprocessor, &FixedClassifier::new(1.5), &row).unwrap_err();
        assert_eq!(err, InferenceError::InvalidProbability(1.5));

        let err = predict_proba(&NullPreprocessor, &FixedClassifier::new(f64::NAN), &row).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidProbability(_)));
    }

    #[test]
    fn test_passes_valid_probability() {
        let row = FeatureRow::default();
        let scored = predict_proba(&NullPreprocessor, &FixedClassifier::new(0.42), &row).unwrap();
        assert_eq!(scored.probability, 0.42);
        assert!(scored.unknown_categories.is_empty());
    }
}
