//! Health check and service metadata handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

pub const SERVICE_NAME: &str = "Diabetes Readmission Predictor API";

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
}

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.artifacts.is_loaded(),
    })
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME,
    })
}
