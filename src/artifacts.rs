//! Artifact Store
//!
//! Loads the classifier, the preprocessor and the model configuration once,
//! validates that they fit together, and hands out a shared read-only handle
//! for the rest of the process lifetime.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::features::unknown_features;
use crate::inference::{Classifier, ClassifierArtifact, ColumnTransformer, Preprocessor};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("artifact not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in config file {}: {source}", path.display())]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize artifact {}: {source}", path.display())]
    MalformedArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("preprocessor produces {preprocessor} features but classifier expects {classifier}")]
    WidthMismatch { preprocessor: usize, classifier: usize },

    #[error("feature names outside the patient record schema: {}", .0.join(", "))]
    UnknownFeature(Vec<String>),

    #[error("preprocessor reads columns missing from the feature lists: {}", .0.join(", "))]
    SchemaMismatch(Vec<String>),
}

/// Decision threshold and the ordered feature names the model was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub threshold: f64,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

/// Locations of the three artifact files
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub model: PathBuf,
    pub preprocessor: PathBuf,
    pub config: PathBuf,
}

impl ArtifactPaths {
    pub fn from_config(config: &Config) -> Self {
        let dir = config.artifacts_dir.clone();
        Self {
            model: dir.join(&config.model_file),
            preprocessor: dir.join(&config.preprocessor_file),
            config: dir.join(&config.model_config_file),
            dir,
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&Config {
            artifacts_dir: dir.into(),
            ..Config::default()
        })
    }
}

/// Where the artifacts came from and what they hashed to at load time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactMetadata {
    pub artifacts_dir: String,
    pub model_sha256: String,
    pub preprocessor_sha256: String,
    pub config_sha256: String,
    pub loaded_at: DateTime<Utc>,
}

/// The loaded model bundle. Never mutated after construction.
pub struct ModelArtifacts {
    pub classifier: Box<dyn Classifier>,
    pub preprocessor: Box<dyn Preprocessor>,
    pub config: ModelConfig,
    /// `None` for bundles assembled in memory
    pub metadata: Option<ArtifactMetadata>,
}

impl ModelArtifacts {
    /// Assemble a bundle, checking the parts are compatible
    pub fn new(
        classifier: Box<dyn Classifier>,
        preprocessor: Box<dyn Preprocessor>,
        config: ModelConfig,
    ) -> Result<Self, LoadError> {
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(LoadError::InvalidThreshold(config.threshold));
        }

        if preprocessor.output_width() != classifier.input_width() {
            return Err(LoadError::WidthMismatch {
                preprocessor: preprocessor.output_width(),
                classifier: classifier.input_width(),
            });
        }

        Ok(Self {
            classifier,
            preprocessor,
            config,
            metadata: None,
        })
    }

    /// Read and validate the artifacts at `paths`.
    ///
    /// With `strict_schema`, every declared feature must map onto the patient
    /// record and every preprocessor input must be declared.
    pub fn load(paths: &ArtifactPaths, strict_schema: bool) -> Result<Self, LoadError> {
        tracing::info!(dir = %paths.dir.display(), "Loading model artifacts");

        let (model_bytes, model_sha256) = read_artifact(&paths.model)?;
        let (preprocessor_bytes, preprocessor_sha256) = read_artifact(&paths.preprocessor)?;
        let (config_bytes, config_sha256) = read_artifact(&paths.config)?;

        let classifier: ClassifierArtifact = serde_json::from_slice(&model_bytes)
            .map_err(|source| LoadError::MalformedArtifact {
                path: paths.model.clone(),
                source,
            })?;

        let preprocessor: ColumnTransformer = serde_json::from_slice(&preprocessor_bytes)
            .map_err(|source| LoadError::MalformedArtifact {
                path: paths.preprocessor.clone(),
                source,
            })?;

        let config: ModelConfig = serde_json::from_slice(&config_bytes)
            .map_err(|source| LoadError::MalformedConfig {
                path: paths.config.clone(),
                source,
            })?;

        if strict_schema {
            check_schema(&config, &preprocessor)?;
        }

        let mut artifacts = Self::new(Box::new(classifier), Box::new(preprocessor), config)?;
        artifacts.metadata = Some(ArtifactMetadata {
            artifacts_dir: paths.dir.display().to_string(),
            model_sha256,
            preprocessor_sha256,
            config_sha256,
            loaded_at: Utc::now(),
        });

        tracing::info!(
            threshold = artifacts.config.threshold,
            numeric = artifacts.config.numeric_features.len(),
            categorical = artifacts.config.categorical_features.len(),
            encoded_width = artifacts.classifier.input_width(),
            "Model artifacts loaded"
        );

        Ok(artifacts)
    }
}

fn read_artifact(path: &Path) -> Result<(Vec<u8>, String), LoadError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::MissingFile(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let digest = format!("{:x}", Sha256::digest(&bytes));
    tracing::debug!(path = %path.display(), sha256 = %digest, "Read artifact");

    Ok((bytes, digest))
}

fn check_schema(config: &ModelConfig, preprocessor: &ColumnTransformer) -> Result<(), LoadError> {
    let unknown = unknown_features(&config.numeric_features, &config.categorical_features);
    if !unknown.is_empty() {
        return Err(LoadError::UnknownFeature(unknown));
    }

    let undeclared: Vec<String> = preprocessor
        .input_columns()
        .filter(|column| {
            !config.numeric_features.iter().any(|n| n == column)
                && !config.categorical_features.iter().any(|c| c == column)
        })
        .map(str::to_string)
        .collect();
    if !undeclared.is_empty() {
        return Err(LoadError::SchemaMismatch(undeclared));
    }

    Ok(())
}

/// Single-initialization holder for [`ModelArtifacts`].
///
/// The first successful [`ArtifactStore::load`] performs all I/O; later calls
/// return the cached handle. Concurrent first calls block on one load.
pub struct ArtifactStore {
    paths: ArtifactPaths,
    strict_schema: bool,
    cell: OnceCell<Arc<ModelArtifacts>>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths, strict_schema: bool) -> Self {
        Self {
            paths,
            strict_schema,
            cell: OnceCell::new(),
        }
    }

    /// A store that already holds `artifacts`
    pub fn with_artifacts(artifacts: ModelArtifacts) -> Self {
        Self {
            paths: ArtifactPaths::in_dir(Config::default().artifacts_dir),
            strict_schema: true,
            cell: OnceCell::with_value(Arc::new(artifacts)),
        }
    }

    pub fn load(&self) -> Result<Arc<ModelArtifacts>, LoadError> {
        self.cell
            .get_or_try_init(|| ModelArtifacts::load(&self.paths, self.strict_schema).map(Arc::new))
            .cloned()
    }

    pub fn get(&self) -> Option<Arc<ModelArtifacts>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}
