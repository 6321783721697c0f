//! Prediction statistics
//!
//! Lock-free counters shared by all request handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Default)]
pub struct PredictionStats {
    predictions: AtomicU64,
    failures: AtomicU64,
    dropped_features: AtomicU64,
    unknown_categories: AtomicU64,
    latency_sum_us: AtomicU64,
}

/// Point-in-time copy of [`PredictionStats`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub prediction_count: u64,
    pub failure_count: u64,
    pub dropped_feature_count: u64,
    pub unknown_category_count: u64,
    pub avg_latency_ms: f64,
}

impl PredictionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, latency: Duration) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, count: usize) {
        self.dropped_features.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_unknown_categories(&self, count: usize) {
        self.unknown_categories.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let count = self.predictions.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        StatsSnapshot {
            prediction_count: count,
            failure_count: self.failures.load(Ordering::Relaxed),
            dropped_feature_count: self.dropped_features.load(Ordering::Relaxed),
            unknown_category_count: self.unknown_categories.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}
