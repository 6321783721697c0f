//! Model metadata handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::artifacts::ArtifactMetadata;
use crate::features::MissingFeaturePolicy;
use crate::stats::StatsSnapshot;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_loaded: bool,
    pub threshold: f64,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub encoded_width: usize,
    pub missing_feature_policy: &'static str,
    pub artifacts: Option<ArtifactMetadata>,
    pub stats: StatsSnapshot,
}

/// Describe the loaded model and its serving statistics
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfoResponse>> {
    let artifacts = state.artifacts.get().ok_or(AppError::ModelNotLoaded)?;

    let missing_feature_policy = match state.config.missing_feature_policy {
        MissingFeaturePolicy::Drop => "drop",
        MissingFeaturePolicy::Reject => "reject",
    };

    Ok(Json(ModelInfoResponse {
        model_loaded: true,
        threshold: artifacts.config.threshold,
        numeric_features: artifacts.config.numeric_features.clone(),
        categorical_features: artifacts.config.categorical_features.clone(),
        encoded_width: artifacts.classifier.input_width(),
        missing_feature_policy,
        artifacts: artifacts.metadata.clone(),
        stats: state.stats.snapshot(),
    }))
}
