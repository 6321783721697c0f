//! Shared fixtures for unit and router tests

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::artifacts::{ArtifactPaths, ModelArtifacts, ModelConfig};
use crate::features::FeatureRow;
use crate::inference::{Classifier, Encoded, InferenceError, Preprocessor};
use crate::models::PatientRecord;

pub const MODEL_JSON: &str = include_str!("../artifacts/diabetes_readmission_model.json");
pub const PREPROCESSOR_JSON: &str = include_str!("../artifacts/preprocessing_transformer.json");
pub const CONFIG_JSON: &str = include_str!("../artifacts/model_config.json");

/// The example patient used throughout the API docs
pub fn sample_patient() -> PatientRecord {
    PatientRecord {
        age: 60,
        num_lab_procedures: 40,
        num_medications: 10,
        num_procedures: 1,
        number_diagnoses: 7,
        number_emergency: 2,
        number_inpatient: 1,
        time_in_hospital: 4,
        admission_type_id: 1,
        diabetes_med: "Yes".to_string(),
        discharge_disposition_def: "home_routine".to_string(),
        disease_class_1: "Diseases of the Circulatory System".to_string(),
        race: "Caucasian".to_string(),
    }
}

pub fn sample_config() -> ModelConfig {
    serde_json::from_str(CONFIG_JSON).unwrap()
}

pub fn sample_numeric() -> Vec<String> {
    sample_config().numeric_features
}

pub fn sample_categorical() -> Vec<String> {
    sample_config().categorical_features
}

/// Write the bundled artifacts into `dir` under their default names
pub fn write_bundle(dir: &Path) {
    let paths = ArtifactPaths::in_dir(dir);
    std::fs::write(&paths.model, MODEL_JSON).unwrap();
    std::fs::write(&paths.preprocessor, PREPROCESSOR_JSON).unwrap();
    std::fs::write(&paths.config, CONFIG_JSON).unwrap();
}

/// Load the bundled artifacts from a fresh temporary directory
pub fn bundled_artifacts() -> ModelArtifacts {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path());
    ModelArtifacts::load(&ArtifactPaths::in_dir(dir.path()), true).unwrap()
}

/// Preprocessor that encodes every row as an empty vector
pub struct NullPreprocessor;

impl Preprocessor for NullPreprocessor {
    fn transform(&self, _row: &FeatureRow) -> Result<Encoded, InferenceError> {
        Ok(Encoded::default())
    }

    fn output_width(&self) -> usize {
        0
    }
}

/// Classifier returning a fixed probability and counting its calls
pub struct FixedClassifier {
    probability: f64,
    width: usize,
    calls: Arc<AtomicUsize>,
}

impl FixedClassifier {
    pub fn new(probability: f64) -> Self {
        Self::with_width(probability, 0)
    }

    pub fn with_width(probability: f64, width: usize) -> Self {
        Self {
            probability,
            width,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Classifier for FixedClassifier {
    fn predict_proba(&self, _encoded: &[f64]) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }

    fn input_width(&self) -> usize {
        self.width
    }
}

/// Artifacts scoring every patient at `probability`, plus a call counter
pub fn fixed_artifacts(probability: f64, threshold: f64) -> (ModelArtifacts, Arc<AtomicUsize>) {
    let classifier = FixedClassifier::new(probability);
    let calls = classifier.calls();
    let config = ModelConfig {
        threshold,
        ..sample_config()
    };
    let artifacts = ModelArtifacts::new(Box::new(classifier), Box::new(NullPreprocessor), config).unwrap();
    (artifacts, calls)
}
