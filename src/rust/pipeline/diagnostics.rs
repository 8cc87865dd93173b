use serde::Serialize;

use super::features::{FeatureVector, TimePeriod};
use super::inference::ClassProbability;
use super::record::{RawRecord, RawValue};
use super::schema::{field, SEVERITY_FIELDS};

/// Everything a presentation layer needs about one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    pub predicted_category: String,
    /// Probability of the predicted category.
    pub confidence: f64,
    /// One entry per class label, in bundle order.
    pub class_probabilities: Vec<ClassProbability>,
    pub severity_score: u8,
    /// `severity_score / 7`
    pub severity_risk: f64,
    pub risk_factors: Vec<String>,
    pub location_cluster: usize,
    pub commercial_vehicle: bool,
    pub time_hour: u32,
    pub time_period: TimePeriod,
    /// The record's point value, as supplied.
    pub points: RawValue,
}

impl InferenceResult {
    pub fn probability(&self, label: &str) -> Option<f64> {
        self.class_probabilities
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.probability)
    }

    /// Severity risk as a percentage, for gauges.
    pub fn severity_percent(&self) -> f64 {
        self.severity_risk * 100.0
    }
}

pub(crate) fn diagnose(
    record: &RawRecord,
    features: &FeatureVector,
    predicted_label: String,
    class_probabilities: Vec<ClassProbability>,
) -> InferenceResult {
    let confidence = class_probabilities
        .iter()
        .map(|c| c.probability)
        .fold(0.0, f64::max);

    InferenceResult {
        predicted_category: predicted_label,
        confidence,
        class_probabilities,
        severity_score: features.severity_score(),
        severity_risk: features.severity_score() as f64 / SEVERITY_FIELDS.len() as f64,
        risk_factors: features.risk_factors().into_iter().map(String::from).collect(),
        location_cluster: features.location_cluster(),
        commercial_vehicle: features.is_commercial(),
        time_hour: features.time_hour(),
        time_period: features.time_period(),
        points: record.get(field::POINTS).cloned().unwrap_or(RawValue::Null),
    }
}
