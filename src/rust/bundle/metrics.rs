use serde::{Deserialize, Serialize};

/// One averaged row of the held-out classification report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: f64,
}

/// Held-out evaluation of the classifier. Descriptive only; inference never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: AverageMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: AverageMetrics,
}

/// Flat view of the headline numbers for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub weighted_f1_score: f64,
    pub accuracy: f64,
    pub support: f64,
}

impl PerformanceMetrics {
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            precision: self.macro_avg.precision,
            recall: self.macro_avg.recall,
            f1_score: self.macro_avg.f1_score,
            weighted_f1_score: self.weighted_avg.f1_score,
            accuracy: self.accuracy,
            support: self.macro_avg.support,
        }
    }
}
