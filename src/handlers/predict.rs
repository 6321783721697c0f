//! Prediction handler

use std::time::Instant;

use axum::{extract::State, Json};

use crate::artifacts::ModelArtifacts;
use crate::decision::decide;
use crate::extract::ValidatedJson;
use crate::features::{self, MissingFeaturePolicy};
use crate::inference;
use crate::models::{PatientRecord, PredictionResponse};
use crate::stats::PredictionStats;
use crate::{AppError, AppResult, AppState};

/// Predict 30-day readmission for one patient
pub async fn predict(
    State(state): State<AppState>,
    ValidatedJson(patient): ValidatedJson<PatientRecord>,
) -> AppResult<Json<PredictionResponse>> {
    let artifacts = state.artifacts.get().ok_or(AppError::ModelNotLoaded)?;

    let started = Instant::now();
    let result = run_pipeline(
        &artifacts,
        &patient,
        state.config.missing_feature_policy,
        &state.stats,
    );

    match result {
        Ok(response) => {
            state.stats.record_success(started.elapsed());
            tracing::debug!(
                probability = response.probability,
                prediction = %response.prediction,
                risk = %response.risk_category,
                "Prediction complete"
            );
            Ok(Json(response))
        }
        Err(e) => {
            state.stats.record_failure();
            Err(e)
        }
    }
}

/// Build features, score them and apply the decision policy
fn run_pipeline(
    artifacts: &ModelArtifacts,
    patient: &PatientRecord,
    policy: MissingFeaturePolicy,
    stats: &PredictionStats,
) -> AppResult<PredictionResponse> {
    let config = &artifacts.config;

    let row = features::build(
        patient,
        &config.numeric_features,
        &config.categorical_features,
        policy,
    )?;
    if !row.dropped().is_empty() {
        stats.record_dropped(row.dropped().len());
    }

    let scored = inference::predict_proba(
        artifacts.preprocessor.as_ref(),
        artifacts.classifier.as_ref(),
        &row,
    )?;
    if !scored.unknown_categories.is_empty() {
        stats.record_unknown_categories(scored.unknown_categories.len());
    }

    let probability = scored.probability;
    Ok(PredictionResponse::new(probability, decide(probability, config.threshold)))
}
